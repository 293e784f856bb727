//! End-to-end run for one book: dispatch, resolve, download.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::download::{DownloadError, DownloadStats};
use crate::parser::{ParseError, parse_book_url};
use crate::progress::ProgressObserver;
use crate::provider::{ProviderContext, ProviderError, ProviderRegistry};
use crate::resolver::ResolveError;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input URL is not a valid web URL.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No provider serves the URL, or the provider cannot use it.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Page discovery failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A page download failed in a way that affects the whole run.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// What a completed run did.
#[derive(Debug)]
pub struct RunSummary {
    /// Provider that served the book.
    pub provider: &'static str,
    /// Number of pages the resolver found.
    pub pages_found: usize,
    /// Download counters.
    pub stats: DownloadStats,
}

/// Downloads every preview page of the book at `url` into `dest`.
///
/// `dest` must exist. The run succeeds once resolution succeeds, even if no
/// page could be saved.
///
/// # Errors
///
/// Returns [`PipelineError`] for an invalid URL, an unknown provider, a
/// failed resolution or a fatal download error.
#[instrument(skip(registry, ctx, observer), fields(dest = %dest.display()))]
pub async fn run(
    url: &str,
    dest: &Path,
    registry: &ProviderRegistry,
    ctx: &ProviderContext,
    observer: Arc<dyn ProgressObserver>,
) -> Result<RunSummary, PipelineError> {
    let url = parse_book_url(url)?;
    let book = registry.open_book(&url, ctx)?;
    observer.provider_resolved(book.provider());

    let pages = book.resolve(observer.as_ref()).await?;
    observer.pages_resolved(pages.len());

    let stats = book.download(&pages, dest, Arc::clone(&observer)).await?;

    info!(
        provider = book.provider(),
        pages = pages.len(),
        saved = stats.saved(),
        unavailable = stats.unavailable(),
        skipped = stats.skipped(),
        "Run complete"
    );

    Ok(RunSummary {
        provider: book.provider(),
        pages_found: pages.len(),
        stats,
    })
}
