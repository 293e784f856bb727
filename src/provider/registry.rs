//! Provider registry.

use tracing::{debug, warn};
use url::Url;

use super::{Book, ProviderContext, ProviderError, google};
use crate::parser::match_host_label;

/// Factory that opens a book from its URL.
pub type OpenBook = fn(&Url, &ProviderContext) -> Result<Box<dyn Book>, ProviderError>;

/// A provider's registry entry.
///
/// Only the name and an opener live here. The opened [`Book`] carries the
/// rest: its page id scheme through [`crate::page::PageId`], its initial
/// lookup headers, and the [`crate::resolver::PageResolver`] and
/// [`crate::download::PageDownloader`] it builds in `resolve` and `download`.
#[derive(Clone, Copy)]
pub struct ProviderBundle {
    /// Hostname label identifying the provider (e.g. `google`).
    pub name: &'static str,
    /// Opens a book served by this provider.
    pub open: OpenBook,
}

impl std::fmt::Debug for ProviderBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderBundle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Returns the first label of `url`'s hostname that is in `known`.
///
/// `books.google.co.uk` yields `google` when `google` is known.
#[must_use]
pub fn provider_name_from_url(url: &Url, known: &[&'static str]) -> Option<&'static str> {
    match_host_label(url, known.iter().copied())
}

/// Builds the registry with every built-in provider.
#[must_use]
pub fn build_default_provider_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(google::bundle());
    registry
}

/// Maps hostname labels to providers.
///
/// Immutable after construction; lookups never touch the network.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    bundles: Vec<ProviderBundle>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider. A provider with the same name is replaced.
    pub fn register(&mut self, bundle: ProviderBundle) {
        if let Some(existing) = self.bundles.iter_mut().find(|b| b.name == bundle.name) {
            warn!(provider = bundle.name, "Replacing registered provider");
            *existing = bundle;
        } else {
            debug!(provider = bundle.name, "Registered provider");
            self.bundles.push(bundle);
        }
    }

    /// Registered provider names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.bundles.iter().map(|b| b.name).collect()
    }

    /// Looks up a provider by name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotRegistered`] for an unknown name.
    pub fn get(&self, name: &str) -> Result<&ProviderBundle, ProviderError> {
        self.bundles
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| ProviderError::NotRegistered {
                name: name.to_string(),
            })
    }

    /// Returns the provider whose name is one of the labels of `url`'s hostname.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownProvider`] when no label matches.
    pub fn provider_for_url(&self, url: &Url) -> Result<&ProviderBundle, ProviderError> {
        let names = self.names();
        let name = provider_name_from_url(url, &names).ok_or_else(|| {
            ProviderError::unknown_provider(url.as_str(), url.host_str().unwrap_or(""), &names)
        })?;
        self.get(name)
    }

    /// Picks the provider for `url` and opens the book.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownProvider`] when no provider matches and
    /// whatever the provider's factory reports for a URL it cannot use.
    pub fn open_book(&self, url: &Url, ctx: &ProviderContext) -> Result<Box<dyn Book>, ProviderError> {
        let bundle = self.provider_for_url(url)?;
        (bundle.open)(url, ctx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::RunSettings;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    fn ctx() -> ProviderContext {
        ProviderContext::new(reqwest::Client::new(), RunSettings::default())
    }

    fn refuse(_: &Url, _: &ProviderContext) -> Result<Box<dyn Book>, ProviderError> {
        Err(ProviderError::NotRegistered {
            name: "refuse".to_string(),
        })
    }

    #[test]
    fn test_google_host_dispatches_to_google() {
        let registry = build_default_provider_registry();
        let bundle = registry
            .provider_for_url(&url("https://books.google.com/books?id=abc"))
            .unwrap();
        assert_eq!(bundle.name, "google");
    }

    #[test]
    fn test_regional_google_host_dispatches_to_google() {
        let registry = build_default_provider_registry();
        let bundle = registry
            .provider_for_url(&url("https://books.google.co.uk/books?id=abc"))
            .unwrap();
        assert_eq!(bundle.name, "google");
    }

    #[test]
    fn test_unknown_host_is_rejected() {
        let registry = build_default_provider_registry();
        let err = registry
            .provider_for_url(&url("https://books.example.org/books?id=abc"))
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider { ref host, .. } if host == "books.example.org"));
    }

    #[test]
    fn test_open_book_unknown_provider() {
        let registry = build_default_provider_registry();
        let err = registry
            .open_book(&url("https://books.example.org/books?id=abc"), &ctx())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::UnknownProvider { .. }));
    }

    #[test]
    fn test_open_book_google() {
        let registry = build_default_provider_registry();
        let book = registry
            .open_book(&url("https://books.google.com/books?id=abc"), &ctx())
            .unwrap();
        assert_eq!(book.provider(), "google");
    }

    #[test]
    fn test_open_book_google_without_id() {
        let registry = build_default_provider_registry();
        let err = registry
            .open_book(&url("https://books.google.com/books"), &ctx())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::InvalidBookUrl(_)));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = build_default_provider_registry();
        registry.register(ProviderBundle {
            name: "google",
            open: refuse,
        });
        assert_eq!(registry.names(), vec!["google"]);
        let err = registry
            .open_book(&url("https://books.google.com/books?id=abc"), &ctx())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::NotRegistered { .. }));
    }

    #[test]
    fn test_provider_name_from_url() {
        assert_eq!(
            provider_name_from_url(&url("https://books.google.com/books?id=x"), &["google"]),
            Some("google")
        );
        assert_eq!(
            provider_name_from_url(&url("https://books.example.org/books?id=x"), &["google"]),
            None
        );
    }

    #[test]
    fn test_get_unregistered_name() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.get("google").unwrap_err(),
            ProviderError::NotRegistered { .. }
        ));
    }
}
