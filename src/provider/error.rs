//! Error types for provider dispatch.

use thiserror::Error;

use crate::parser::ParseError;

/// Errors raised before any request is sent for a book.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No label of the URL's hostname names a known provider
    #[error(
        "could not determine provider for '{url}' (host '{host}')\n  Suggestion: Supported providers: {known}"
    )]
    UnknownProvider {
        /// The input URL
        url: String,
        /// Its hostname
        host: String,
        /// Comma-separated provider names
        known: String,
    },

    /// A provider name was requested that the registry does not hold
    #[error("provider '{name}' is not registered")]
    NotRegistered {
        /// Requested provider name
        name: String,
    },

    /// The URL names a known provider but cannot identify a book
    #[error("invalid book URL: {0}")]
    InvalidBookUrl(#[from] ParseError),
}

impl ProviderError {
    /// Creates an `UnknownProvider` error.
    #[must_use]
    pub fn unknown_provider(url: &str, host: &str, known: &[&str]) -> Self {
        Self::UnknownProvider {
            url: url.to_string(),
            host: host.to_string(),
            known: known.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_message_lists_known_providers() {
        let err = ProviderError::unknown_provider(
            "https://books.example.org/books?id=x",
            "books.example.org",
            &["google"],
        );
        let msg = err.to_string();
        assert!(msg.contains("could not determine provider"), "{msg}");
        assert!(msg.contains("books.example.org"), "{msg}");
        assert!(msg.contains("Supported providers: google"), "{msg}");
    }

    #[test]
    fn test_invalid_book_url_wraps_parse_error() {
        let err: ProviderError = ParseError::missing_query_param("https://books.google.com/books", "id").into();
        assert!(err.to_string().contains("'id'"));
    }
}
