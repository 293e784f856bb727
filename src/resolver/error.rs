//! Error types for page resolution.
//!
//! Every variant is fatal: resolution either produces the complete ordered
//! page list or nothing.

use thiserror::Error;

use crate::page::PageId;
use crate::parser::ParseError;

/// Errors that abort page resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The lookup endpoint answered with a status other than 200.
    #[error("lookup for page {cursor} returned HTTP {status} ({url})")]
    HttpStatus {
        /// Lookup URL.
        url: String,
        /// Page id being looked up.
        cursor: PageId,
        /// Status code received.
        status: u16,
    },

    /// Transport failure while talking to the lookup endpoint.
    #[error("network error during lookup {url}: {source}")]
    Network {
        /// Lookup URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The lookup request timed out.
    #[error("lookup timed out: {url}\n  Suggestion: Retry later or raise --read-timeout")]
    Timeout {
        /// Lookup URL.
        url: String,
    },

    /// The lookup payload is not the expected shape.
    #[error("malformed lookup response for page {cursor}: {reason}")]
    MalformedResponse {
        /// Page id being looked up.
        cursor: PageId,
        /// What was wrong with the payload.
        reason: String,
    },

    /// A page id token in the payload could not be parsed.
    #[error("lookup response contained an invalid page id: {0}")]
    InvalidPageId(#[from] ParseError),

    /// The lookup budget ran out before the page set was exhausted.
    #[error(
        "gave up after {limit} lookups (last page queried: {cursor})\n  Suggestion: Raise --max-lookups if the book is unusually long"
    )]
    LookupBudgetExhausted {
        /// Number of lookups allowed.
        limit: usize,
        /// Last page id queried.
        cursor: PageId,
    },
}

impl ResolveError {
    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(cursor: PageId, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            cursor,
            reason: reason.into(),
        }
    }

    /// Maps a transport error, separating timeouts.
    #[must_use]
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = ResolveError::HttpStatus {
            url: "https://books.google.com/books?id=x&pg=PP1".to_string(),
            cursor: PageId::first(),
            status: 503,
        };
        let msg = err.to_string();
        assert!(msg.contains("503"), "{msg}");
        assert!(msg.contains("PP1"), "{msg}");
    }

    #[test]
    fn test_malformed_message() {
        let msg = ResolveError::malformed(PageId::first(), "missing 'page' list").to_string();
        assert!(msg.contains("malformed lookup response"), "{msg}");
        assert!(msg.contains("missing 'page' list"), "{msg}");
    }

    #[test]
    fn test_invalid_page_id_from_parse_error() {
        let err: ResolveError = ParseError::invalid_page_id("ZZ1", "unknown").into();
        assert!(matches!(err, ResolveError::InvalidPageId(_)));
    }
}
