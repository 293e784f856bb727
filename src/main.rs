//! CLI entry point for gbooks-dl.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gbooks_dl_core::progress::{ProgressObserver, TracingProgress};
use gbooks_dl_core::provider::{ProviderContext, build_default_provider_registry};
use gbooks_dl_core::{build_http_client, run};
use tracing::{debug, info};

mod cli;
mod progress_bar;

use cli::Args;
use progress_bar::BarProgress;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");
    info!("gbooks-dl starting");

    let dest = &args.output_folder;
    std::fs::create_dir_all(dest)
        .with_context(|| format!("could not create output folder {}", dest.display()))?;

    let settings = args.run_settings();
    let client = build_http_client(settings.timeouts).context("could not build HTTP client")?;
    let registry = build_default_provider_registry();
    let ctx = ProviderContext::new(client, settings);

    let bar = (!args.quiet && io::stderr().is_terminal()).then(|| Arc::new(BarProgress::new()));
    let observer = match &bar {
        Some(bar) => Arc::clone(bar) as Arc<dyn ProgressObserver>,
        None => Arc::new(TracingProgress) as Arc<dyn ProgressObserver>,
    };

    let result = run(&args.url, dest, &registry, &ctx, observer).await;
    if let Some(bar) = &bar {
        bar.finish();
    }
    let summary = result?;

    info!(
        provider = summary.provider,
        pages = summary.pages_found,
        saved = summary.stats.saved(),
        unavailable = summary.stats.unavailable(),
        skipped = summary.stats.skipped(),
        dest = %dest.display(),
        "Download complete"
    );

    Ok(())
}
