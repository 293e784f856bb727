//! Error types for input and identifier parsing.

use thiserror::Error;

/// Maximum URL length to accept (standard browser limit).
pub const MAX_URL_LENGTH: usize = 2000;

/// Errors that can occur while parsing a book URL or a page identifier token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// URL is malformed, too long, or uses an unsupported scheme
    #[error("invalid URL '{url}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The URL that failed validation
        url: String,
        /// Why the URL is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// A query parameter the provider needs is absent from the URL
    #[error(
        "URL '{url}' has no '{param}' query parameter\n  Suggestion: Paste the book URL unmodified, including its query string"
    )]
    MissingQueryParam {
        /// The URL that was inspected
        url: String,
        /// The missing parameter name
        param: String,
    },

    /// A page identifier token does not match `{category code}{digits}`
    #[error("invalid page id '{token}': {reason}")]
    InvalidPageId {
        /// The offending token
        token: String,
        /// What was wrong with it
        reason: String,
    },
}

impl ParseError {
    /// Creates an `InvalidUrl` error for a non-web URL scheme.
    #[must_use]
    pub fn unsupported_scheme(url: &str, scheme: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: format!("scheme '{scheme}' is not supported"),
            suggestion: "Use http:// or https:// URLs".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a malformed URL.
    #[must_use]
    pub fn malformed(url: &str, parse_error: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a URL without a host.
    #[must_use]
    pub fn no_host(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
            suggestion: "Ensure the URL includes a domain (e.g., books.google.com)".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for URLs exceeding the maximum length.
    #[must_use]
    pub fn too_long(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.chars().take(50).collect(),
            reason: format!("URL too long ({} chars, max {MAX_URL_LENGTH})", url.len()),
            suggestion: "Check for extraneous content pasted after the URL".to_string(),
        }
    }

    /// Creates a `MissingQueryParam` error.
    #[must_use]
    pub fn missing_query_param(url: &str, param: &str) -> Self {
        Self::MissingQueryParam {
            url: url.to_string(),
            param: param.to_string(),
        }
    }

    /// Creates an `InvalidPageId` error.
    #[must_use]
    pub fn invalid_page_id(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPageId {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
