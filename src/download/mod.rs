//! Page image downloads.
//!
//! This module turns a resolved page list into files on disk.
//!
//! # Features
//!
//! - Bounded concurrent fetches sharing one session
//! - Placeholder detection by MD5 fingerprint
//! - Extension mapping from the response media type
//! - Per-page failures counted instead of aborting the run
//!
//! # Example
//!
//! ```no_run
//! use gbooks_dl_core::download::{PageDownloader, PlaceholderFilter};
//! use gbooks_dl_core::page::Page;
//! use gbooks_dl_core::progress::TracingProgress;
//! use gbooks_dl_core::session::SessionState;
//! use reqwest::header::HeaderMap;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = PageDownloader::new(
//!     reqwest::Client::new(),
//!     SessionState::new().into_shared(),
//!     HeaderMap::new(),
//! )
//! .with_placeholder_filter(PlaceholderFilter::from_fingerprints(["a64fa89d7ebc97075c1d363fc5fea71f"]));
//!
//! let pages = vec![Page::new("PP1".parse()?, "https://books.google.com/books/content?pg=PP1")];
//! let stats = downloader
//!     .download_pages(&pages, Path::new("./pages"), Arc::new(TracingProgress))
//!     .await?;
//! println!("Saved: {}, unavailable: {}, skipped: {}", stats.saved(), stats.unavailable(), stats.skipped());
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod filename;
mod validate;

pub use engine::{DownloadStats, PageDownloader, PageOutcome};
pub use error::DownloadError;
pub use filename::{FALLBACK_EXTENSION, extension_for_media_type, extension_or_fallback, page_filename};
pub use validate::PlaceholderFilter;
