//! Book providers and dispatch from a book URL to the provider serving it.
//!
//! # Architecture
//!
//! - [`Book`] - Async trait: resolve the page list, then download it
//! - [`ProviderBundle`] - A provider's name and its book factory
//! - [`ProviderRegistry`] - Maps a hostname label to a bundle
//! - [`google`] - Google Books
//!
//! # Example
//!
//! ```no_run
//! use gbooks_dl_core::config::RunSettings;
//! use gbooks_dl_core::progress::TracingProgress;
//! use gbooks_dl_core::provider::{ProviderContext, build_default_provider_registry};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_provider_registry();
//! let ctx = ProviderContext::new(reqwest::Client::new(), RunSettings::default());
//!
//! let url = Url::parse("https://books.google.com/books?id=wZ0kAQAAMAAJ")?;
//! let book = registry.open_book(&url, &ctx)?;
//! let pages = book.resolve(&TracingProgress).await?;
//! println!("{} pages", pages.len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod google;
mod registry;

pub use error::ProviderError;
pub use registry::{
    OpenBook, ProviderBundle, ProviderRegistry, build_default_provider_registry,
    provider_name_from_url,
};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::RunSettings;
use crate::download::{DownloadError, DownloadStats};
use crate::page::Page;
use crate::progress::ProgressObserver;
use crate::resolver::ResolveError;
use crate::session::SharedSession;

/// Shared resources handed to a provider when a book is opened.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    /// HTTP client used for every request of the run.
    pub client: Client,
    /// Run settings.
    pub settings: RunSettings,
}

impl ProviderContext {
    /// Creates a context.
    #[must_use]
    pub fn new(client: Client, settings: RunSettings) -> Self {
        Self { client, settings }
    }
}

/// A book opened by a provider.
///
/// Resolution must finish before downloading starts; both phases share the
/// book's session.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the registry can hand out `Box<dyn Book>`.
#[async_trait]
pub trait Book: Send + Sync {
    /// Name of the provider that opened this book.
    fn provider(&self) -> &'static str;

    /// The session shared by lookups and page downloads.
    fn session(&self) -> SharedSession;

    /// Discovers every downloadable page, in reading order.
    async fn resolve(&self, observer: &dyn ProgressObserver) -> Result<Vec<Page>, ResolveError>;

    /// Downloads `pages` into `dest`.
    async fn download(
        &self,
        pages: &[Page],
        dest: &Path,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<DownloadStats, DownloadError>;
}
