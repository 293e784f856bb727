//! Google Books preview provider.
//!
//! Pages are discovered through the `jscmd=click3` lookup endpoint of the
//! host the book URL points at, then fetched with image headers. Google gates
//! content behind a `CONSENT` cookie and serves a fixed "page not available"
//! image for pages outside the preview.

mod headers;

pub use headers::{
    DEFAULT_ACCEPT_LANGUAGE, HeaderKind, HeaderProfiles, accept_language_for_locale,
    accept_language_from_env,
};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::{Book, ProviderBundle, ProviderContext, ProviderError};
use crate::config::RunSettings;
use crate::download::{DownloadError, DownloadStats, PageDownloader, PlaceholderFilter};
use crate::page::{Page, PageId};
use crate::parser::required_query_param;
use crate::progress::ProgressObserver;
use crate::resolver::{LookupPayload, LookupSource, PageResolver, ResolveError};
use crate::session::{ConsentGate, SessionState, SharedSession, with_session};

/// Registry name; matched against the labels of the book URL's hostname.
pub const PROVIDER_NAME: &str = "google";

/// MD5 of the image Google serves for pages outside the preview.
pub const PLACEHOLDER_MD5: &str = "a64fa89d7ebc97075c1d363fc5fea71f";

/// Query parameter carrying the book id.
pub const BOOK_ID_PARAM: &str = "id";

const LOOKUP_PATH: &str = "/books";

/// Google's consent cookie and the acknowledgement it expects.
#[must_use]
pub fn consent_gate() -> ConsentGate {
    ConsentGate {
        cookie_name: "CONSENT",
        pending_marker: "PENDING",
        token_prefix: "YES+cb.20210328-17-p0.en+FX+",
    }
}

/// Registry entry for this provider.
#[must_use]
pub fn bundle() -> ProviderBundle {
    ProviderBundle {
        name: PROVIDER_NAME,
        open: open_book,
    }
}

fn open_book(url: &Url, ctx: &ProviderContext) -> Result<Box<dyn Book>, ProviderError> {
    Ok(Box::new(GoogleBook::open(url, ctx)?))
}

/// One Google Books volume, with the session shared by both phases.
pub struct GoogleBook {
    book_id: String,
    origin: Url,
    client: Client,
    session: SharedSession,
    headers: HeaderProfiles,
    settings: RunSettings,
    placeholder: PlaceholderFilter,
}

impl GoogleBook {
    /// Opens a book from its URL, e.g. `https://books.google.com/books?id=XXXX`.
    ///
    /// Lookups go to the scheme and host of `url`. A User-Agent is drawn once
    /// here and used for every request of the book.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBookUrl`] when the `id` parameter is missing.
    pub fn open(url: &Url, ctx: &ProviderContext) -> Result<Self, ProviderError> {
        let book_id = required_query_param(url, BOOK_ID_PARAM)?;
        Ok(Self::with_headers(
            book_id,
            url,
            ctx,
            HeaderProfiles::from_environment(),
        ))
    }

    /// Opens a book with explicit header profiles.
    #[must_use]
    pub fn with_headers(
        book_id: impl Into<String>,
        url: &Url,
        ctx: &ProviderContext,
        headers: HeaderProfiles,
    ) -> Self {
        let mut origin = url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);

        Self {
            book_id: book_id.into(),
            origin,
            client: ctx.client.clone(),
            session: SessionState::with_consent_gate(consent_gate()).into_shared(),
            headers,
            settings: ctx.settings.clone(),
            placeholder: PlaceholderFilter::from_fingerprints([PLACEHOLDER_MD5]),
        }
    }

    /// Replaces the placeholder filter.
    #[must_use]
    pub fn with_placeholder_filter(mut self, filter: PlaceholderFilter) -> Self {
        self.placeholder = filter;
        self
    }

    /// The book id from the URL.
    #[must_use]
    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    /// Builds the lookup URL for `cursor`.
    #[must_use]
    pub fn lookup_url(&self, cursor: PageId) -> Url {
        let mut url = self.origin.clone();
        url.set_path(LOOKUP_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("id", &self.book_id)
            .append_pair("newbks", "0")
            .append_pair("pg", &cursor.to_string())
            .append_pair("source", "entity_page")
            .append_pair("jscmd", "click3");
        url
    }
}

impl std::fmt::Debug for GoogleBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleBook")
            .field("book_id", &self.book_id)
            .field("origin", &self.origin.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LookupSource for GoogleBook {
    #[instrument(skip(self), fields(book_id = %self.book_id))]
    async fn lookup(&self, cursor: PageId) -> Result<LookupPayload, ResolveError> {
        let url = self.lookup_url(cursor);

        let mut headers = self.headers.get(HeaderKind::Lookup).clone();
        with_session(&self.session, |session| session.apply_to(&mut headers, &url));

        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| ResolveError::transport(url.as_str(), e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ResolveError::HttpStatus {
                url: url.to_string(),
                cursor,
                status: status.as_u16(),
            });
        }

        with_session(&self.session, |session| session.absorb(response.headers(), response.url()));

        let body = response
            .bytes()
            .await
            .map_err(|e| ResolveError::transport(url.as_str(), e))?;
        debug!(bytes = body.len(), "Lookup response received");

        serde_json::from_slice(&body)
            .map_err(|e| ResolveError::malformed(cursor, format!("response is not valid JSON: {e}")))
    }
}

#[async_trait]
impl Book for GoogleBook {
    fn provider(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    async fn resolve(&self, observer: &dyn ProgressObserver) -> Result<Vec<Page>, ResolveError> {
        PageResolver::new(self)
            .with_max_lookups(self.settings.max_lookups)
            .resolve(observer)
            .await
    }

    async fn download(
        &self,
        pages: &[Page],
        dest: &Path,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<DownloadStats, DownloadError> {
        PageDownloader::new(
            self.client.clone(),
            Arc::clone(&self.session),
            self.headers.get(HeaderKind::PageImage).clone(),
        )
        .with_placeholder_filter(self.placeholder.clone())
        .with_concurrency(self.settings.effective_concurrency())
        .download_pages(pages, dest, observer)
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ctx() -> ProviderContext {
        ProviderContext::new(Client::new(), RunSettings::default())
    }

    fn book(url: &str) -> GoogleBook {
        GoogleBook::open(&Url::parse(url).unwrap(), &ctx()).unwrap()
    }

    #[test]
    fn test_open_extracts_book_id() {
        let book = book("https://books.google.com/books?id=wZ0kAQAAMAAJ&printsec=frontcover");
        assert_eq!(book.book_id(), "wZ0kAQAAMAAJ");
    }

    #[test]
    fn test_open_without_id_is_rejected() {
        let err = GoogleBook::open(&Url::parse("https://books.google.com/books?vid=x").unwrap(), &ctx())
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBookUrl(_)));
    }

    #[test]
    fn test_lookup_url_uses_input_host() {
        let book = book("https://books.google.de/books?id=abc&hl=de#v=onepage");
        let url = book.lookup_url("PA7".parse().unwrap());
        assert_eq!(
            url.as_str(),
            "https://books.google.de/books?id=abc&newbks=0&pg=PA7&source=entity_page&jscmd=click3"
        );
    }

    #[test]
    fn test_lookup_url_keeps_port() {
        let book = book("http://127.0.0.1:8080/books/edition/_/abc?id=abc");
        let url = book.lookup_url(PageId::first());
        assert_eq!(url.host_str(), Some("127.0.0.1"));
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.path(), "/books");
    }

    #[test]
    fn test_consent_gate_token_format() {
        let token = consent_gate().acknowledge("PENDING+915");
        assert_eq!(token, "YES+cb.20210328-17-p0.en+FX+915");
    }

    #[test]
    fn test_book_provider_name() {
        let book = book("https://books.google.com/books?id=abc");
        assert_eq!(Book::provider(&book), "google");
    }
}
