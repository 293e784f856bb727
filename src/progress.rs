//! Observable progress events of a run.
//!
//! The resolver and downloader report what they are doing through a
//! [`ProgressObserver`]. Events carry no control-flow meaning; they exist for
//! the user. [`TracingProgress`] logs them and is the library default.

use std::path::Path;

use tracing::{info, warn};

use crate::page::{Page, PageId};

/// Receiver of progress events. Every method defaults to a no-op.
pub trait ProgressObserver: Send + Sync {
    /// A provider was selected for the input URL.
    fn provider_resolved(&self, _provider: &str) {}

    /// A lookup request is about to be sent for `cursor`.
    fn lookup_issued(&self, _cursor: PageId) {}

    /// A lookup response revealed a different maximum page id.
    fn max_page_found(&self, _max: PageId) {}

    /// Resolution finished with `count` downloadable pages.
    fn pages_resolved(&self, _count: usize) {}

    /// Page `position` of `total` (1-based) is about to be fetched.
    fn download_started(&self, _position: usize, _total: usize, _page: &Page) {}

    /// Page `position` was written to `path`.
    fn page_saved(&self, _position: usize, _total: usize, _page: &Page, _path: &Path) {}

    /// The provider served its placeholder image instead of page `position`.
    fn page_unavailable(&self, _position: usize, _total: usize, _page: &Page) {}

    /// Page `position` was skipped because the request failed.
    fn page_skipped(&self, _position: usize, _total: usize, _page: &Page, _reason: &str) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Observer that logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn provider_resolved(&self, provider: &str) {
        info!(provider, "Extracted provider from URL");
    }

    fn lookup_issued(&self, cursor: PageId) {
        info!(page = %cursor, "Querying source for page");
    }

    fn max_page_found(&self, max: PageId) {
        info!(page = %max, "Found max page");
    }

    fn pages_resolved(&self, count: usize) {
        info!(pages = count, "Got pages to download");
    }

    fn download_started(&self, position: usize, total: usize, page: &Page) {
        info!(page = %page.id, "Downloading page {position}/{total}");
    }

    fn page_unavailable(&self, position: usize, total: usize, page: &Page) {
        warn!(page = %page.id, url = %page.source_url, "Page {position}/{total} is not available in the preview");
    }

    fn page_skipped(&self, position: usize, total: usize, page: &Page, reason: &str) {
        warn!(page = %page.id, url = %page.source_url, reason, "Skipped page {position}/{total}");
    }
}
