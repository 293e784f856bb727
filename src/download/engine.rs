//! Page image download engine.
//!
//! [`PageDownloader`] fetches every page of a resolved book, validates the
//! payload and writes it to the destination directory. Per-page failures
//! (error status, timeout, placeholder image) are reported and counted; only
//! failures that would hit every following page too abort the run.
//!
//! Fetches run as Tokio tasks bounded by a semaphore. With a concurrency of 1
//! pages are fetched strictly in order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::DownloadError;
use super::filename::{extension_or_fallback, page_filename};
use super::validate::PlaceholderFilter;
use crate::config::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use crate::page::Page;
use crate::progress::ProgressObserver;
use crate::session::{SharedSession, with_session};

/// Result of one page fetch that did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was written to this path.
    Saved(PathBuf),
    /// The provider served its placeholder image; nothing was written.
    Unavailable,
    /// The request failed for this page only.
    Skipped(String),
}

/// Counters for a download run.
///
/// Uses atomic counters so concurrent page tasks can update them.
#[derive(Debug, Default)]
pub struct DownloadStats {
    saved: AtomicUsize,
    unavailable: AtomicUsize,
    skipped: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages written to disk.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }

    /// Pages answered with the placeholder image.
    #[must_use]
    pub fn unavailable(&self) -> usize {
        self.unavailable.load(Ordering::SeqCst)
    }

    /// Pages skipped after an error status or timeout.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Total pages attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.saved() + self.unavailable() + self.skipped()
    }

    fn record(&self, outcome: &PageOutcome) {
        let counter = match outcome {
            PageOutcome::Saved(_) => &self.saved,
            PageOutcome::Unavailable => &self.unavailable,
            PageOutcome::Skipped(_) => &self.skipped,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> Self {
        Self {
            saved: AtomicUsize::new(self.saved()),
            unavailable: AtomicUsize::new(self.unavailable()),
            skipped: AtomicUsize::new(self.skipped()),
        }
    }
}

/// Everything a page task needs, shared across tasks.
#[derive(Debug, Clone)]
struct PageFetcher {
    client: Client,
    session: SharedSession,
    headers: HeaderMap,
    filter: PlaceholderFilter,
}

impl PageFetcher {
    /// Fetches one page. Skip-class failures come back as errors too; the
    /// caller decides what they mean.
    async fn fetch(&self, page: &Page, dest: &Path, position: usize) -> Result<PageOutcome, DownloadError> {
        let url = Url::parse(&page.source_url).map_err(|_| DownloadError::invalid_url(&page.source_url))?;

        let mut headers = self.headers.clone();
        with_session(&self.session, |session| session.apply_to(&mut headers, &url));

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| DownloadError::network(&page.source_url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(&page.source_url, status.as_u16()));
        }

        with_session(&self.session, |session| session.absorb(response.headers(), response.url()));

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(&page.source_url, e))?;

        if self.filter.is_placeholder(&body) {
            debug!(page = %page.id, "Payload matches placeholder fingerprint");
            return Ok(PageOutcome::Unavailable);
        }

        let extension = extension_or_fallback(content_type.as_deref());
        let path = dest.join(page_filename(position, page.id, extension));
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| DownloadError::io(&path, e))?;

        debug!(page = %page.id, path = %path.display(), bytes = body.len(), "Page written");
        Ok(PageOutcome::Saved(path))
    }

    /// Fetches one page and turns skip-class failures into an outcome.
    async fn fetch_or_skip(&self, page: &Page, dest: &Path, position: usize) -> Result<PageOutcome, DownloadError> {
        match self.fetch(page, dest, position).await {
            Err(error) if error.is_page_skip() => Ok(PageOutcome::Skipped(error.to_string())),
            other => other,
        }
    }
}

/// Downloads resolved pages into a directory.
#[derive(Debug, Clone)]
pub struct PageDownloader {
    fetcher: Arc<PageFetcher>,
    concurrency: usize,
}

impl PageDownloader {
    /// Creates a sequential downloader.
    ///
    /// `headers` is the image-request header profile; session headers and
    /// cookies are layered on top for every request.
    #[must_use]
    pub fn new(client: Client, session: SharedSession, headers: HeaderMap) -> Self {
        Self {
            fetcher: Arc::new(PageFetcher {
                client,
                session,
                headers,
                filter: PlaceholderFilter::none(),
            }),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the placeholder filter.
    #[must_use]
    pub fn with_placeholder_filter(mut self, filter: PlaceholderFilter) -> Self {
        Arc::make_mut(&mut self.fetcher).filter = filter;
        self
    }

    /// Sets the number of pages fetched at once, clamped to `1..=MAX_CONCURRENCY`.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Returns the configured concurrency.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads a single page as `position` of the book.
    ///
    /// # Errors
    ///
    /// Returns fatal [`DownloadError`]s only; error statuses and timeouts
    /// become [`PageOutcome::Skipped`].
    pub async fn download_page(&self, page: &Page, dest: &Path, position: usize) -> Result<PageOutcome, DownloadError> {
        self.fetcher.fetch_or_skip(page, dest, position).await
    }

    /// Downloads `pages` into `dest`, naming files by 1-based position.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error (network failure, disk error, malformed
    /// page URL). Pages already in flight finish; no new page is started.
    #[instrument(skip(self, pages, observer), fields(pages = pages.len(), dest = %dest.display(), concurrency = self.concurrency))]
    pub async fn download_pages(
        &self,
        pages: &[Page],
        dest: &Path,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<DownloadStats, DownloadError> {
        let total = pages.len();
        let stats = Arc::new(DownloadStats::new());
        let aborted = Arc::new(AtomicBool::new(false));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(total);

        info!("Starting page downloads");

        for (index, page) in pages.iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| DownloadError::Task {
                    reason: "semaphore closed".to_string(),
                })?;

            if aborted.load(Ordering::SeqCst) {
                debug!(remaining = total - index, "Not starting further pages after fatal error");
                break;
            }

            let position = index + 1;
            let page = page.clone();
            let dest = dest.to_path_buf();
            let fetcher = Arc::clone(&self.fetcher);
            let observer = Arc::clone(&observer);
            let stats = Arc::clone(&stats);
            let aborted = Arc::clone(&aborted);

            handles.push(tokio::spawn(async move {
                let _permit = permit;

                observer.download_started(position, total, &page);
                let result = fetcher.fetch_or_skip(&page, &dest, position).await;

                match &result {
                    Ok(outcome) => {
                        match outcome {
                            PageOutcome::Saved(path) => observer.page_saved(position, total, &page, path),
                            PageOutcome::Unavailable => observer.page_unavailable(position, total, &page),
                            PageOutcome::Skipped(reason) => observer.page_skipped(position, total, &page, reason),
                        }
                        stats.record(outcome);
                    }
                    Err(error) => {
                        warn!(page = %page.id, url = %page.source_url, error = %error, "Fatal error downloading page");
                        aborted.store(true, Ordering::SeqCst);
                    }
                }
                result
            }));
        }

        debug!(task_count = handles.len(), "Waiting for page downloads to complete");

        let mut first_error = None;
        for handle in handles {
            let error = match handle.await {
                Ok(Ok(_)) => continue,
                Ok(Err(error)) => error,
                Err(join_error) => DownloadError::Task {
                    reason: join_error.to_string(),
                },
            };
            if first_error.is_none() {
                first_error = Some(error);
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        info!(
            saved = stats.saved(),
            unavailable = stats.unavailable(),
            skipped = stats.skipped(),
            total,
            "Page downloads complete"
        );

        Ok(stats.snapshot())
    }
}
