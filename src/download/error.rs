//! Error types for the download module.
//!
//! Per-page problems (an error status, a timeout) are recovered by the
//! downloader; everything else aborts the run. [`DownloadError::is_page_skip`]
//! draws that line.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or saving a page image.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered with a status other than 200.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a page.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The page's source URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A download task panicked or was cancelled.
    #[error("download task failed: {reason}")]
    Task {
        /// Join error description.
        reason: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error, separating timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns true for failures that only cost the current page.
    #[must_use]
    pub fn is_page_skip(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://books.google.com/img?pg=PA1", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("pg=PA1"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let error = DownloadError::io(PathBuf::from("/tmp/1_PP1.png"), io_error);
        assert!(error.to_string().contains("/tmp/1_PP1.png"));
    }

    #[test]
    fn test_page_skip_classification() {
        assert!(DownloadError::http_status("u", 404).is_page_skip());
        assert!(DownloadError::http_status("u", 500).is_page_skip());
        assert!(DownloadError::timeout("u").is_page_skip());
        assert!(!DownloadError::invalid_url("u").is_page_skip());
        let io_error = std::io::Error::other("boom");
        assert!(!DownloadError::io("/tmp/x", io_error).is_page_skip());
    }
}
