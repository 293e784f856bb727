//! Terminal progress bar for the download phase.

use std::path::Path;

use gbooks_dl_core::page::{Page, PageId};
use gbooks_dl_core::progress::{ProgressObserver, TracingProgress};
use indicatif::{ProgressBar, ProgressStyle};

/// Shows download progress as a bar; every other event goes to tracing.
#[derive(Debug)]
pub(crate) struct BarProgress {
    bar: ProgressBar,
    log: TracingProgress,
}

impl BarProgress {
    pub(crate) fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar,
            log: TracingProgress,
        }
    }

    /// Removes the bar from the terminal.
    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarProgress {
    fn provider_resolved(&self, provider: &str) {
        self.bar.suspend(|| self.log.provider_resolved(provider));
    }

    fn lookup_issued(&self, cursor: PageId) {
        self.bar.suspend(|| self.log.lookup_issued(cursor));
    }

    fn max_page_found(&self, max: PageId) {
        self.bar.suspend(|| self.log.max_page_found(max));
    }

    fn pages_resolved(&self, count: usize) {
        self.bar.suspend(|| self.log.pages_resolved(count));
        self.bar.set_length(u64::try_from(count).unwrap_or(u64::MAX));
        self.bar.set_position(0);
    }

    fn download_started(&self, _position: usize, _total: usize, page: &Page) {
        self.bar.set_message(format!("page {}", page.id));
    }

    fn page_saved(&self, _position: usize, _total: usize, _page: &Page, _path: &Path) {
        self.bar.inc(1);
    }

    fn page_unavailable(&self, position: usize, total: usize, page: &Page) {
        self.bar.suspend(|| self.log.page_unavailable(position, total, page));
        self.bar.inc(1);
    }

    fn page_skipped(&self, position: usize, total: usize, page: &Page, reason: &str) {
        self.bar.suspend(|| self.log.page_skipped(position, total, page, reason));
        self.bar.inc(1);
    }
}
