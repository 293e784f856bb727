//! gbooks-dl Core Library
//!
//! This library downloads the preview pages of an online book to a local
//! directory. A run has two strictly ordered phases: page resolution, which
//! walks the provider's lookup endpoint until the full page list is known,
//! then page download.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`page`] - Page identifiers and their reading order
//! - [`parser`] - Book URL validation
//! - [`session`] - Cookie and consent state shared by all requests of a book
//! - [`resolver`] - The page discovery loop
//! - [`download`] - Page image download engine
//! - [`provider`] - Provider registry and the Google Books provider
//! - [`pipeline`] - One-call orchestration of a run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod http_client;
pub mod page;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod user_agent;

// Re-export commonly used types
pub use config::{HttpTimeouts, RunSettings};
pub use download::{DownloadError, DownloadStats, PageDownloader, PageOutcome, PlaceholderFilter};
pub use http_client::build_http_client;
pub use page::{Page, PageId, PageKind};
pub use parser::ParseError;
pub use pipeline::{PipelineError, RunSummary, run};
pub use progress::{NoProgress, ProgressObserver, TracingProgress};
pub use provider::{
    Book, ProviderContext, ProviderError, ProviderRegistry, build_default_provider_registry,
};
pub use resolver::{LookupSource, PageResolver, ResolveError};
pub use session::{SessionState, SharedSession};
