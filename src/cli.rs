//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use gbooks_dl_core::config::{
    DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_LOOKUPS,
    DEFAULT_READ_TIMEOUT_SECS, HttpTimeouts, RunSettings,
};

/// Download online book previews to your local computer.
///
/// The provider is inferred from the URL's hostname, e.g. the 'google' part
/// of 'https://books.google.com/books?id=...'. Paste the URL unmodified.
#[derive(Parser, Debug)]
#[command(name = "gbooks-dl")]
#[command(author, version, about)]
pub struct Args {
    /// A URL of a book with a preview to be downloaded
    #[arg(value_name = "URL")]
    pub url: String,

    /// Folder in which the page images are saved (created if missing)
    #[arg(short = 'f', long, default_value = ".")]
    pub output_folder: PathBuf,

    /// Maximum concurrent page downloads (1-16)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub concurrency: u8,

    /// Maximum lookup requests before page discovery gives up
    #[arg(long, default_value_t = DEFAULT_MAX_LOOKUPS as u32, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_lookups: u32,

    /// Seconds allowed to establish a connection (1-300)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub connect_timeout: u64,

    /// Seconds allowed for a whole request, body included (1-600)
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub read_timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Run settings for the library.
    #[must_use]
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            timeouts: HttpTimeouts {
                connect_secs: self.connect_timeout,
                read_secs: self.read_timeout,
            },
            concurrency: usize::from(self.concurrency),
            max_lookups: usize::try_from(self.max_lookups).unwrap_or(usize::MAX),
        }
    }
}
