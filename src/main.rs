//! # News Check
//!
//! A small HTTP service that tells a caller whether a piece of news is
//! corroborated by trusted Vietnamese news sites.
//!
//! ## Features
//!
//! - Searches VnExpress, Thanh Niên, Tuổi Trẻ and VietnamNet for the query
//! - Extracts article headlines and links with per-site CSS selector rules
//! - Scores headlines by diacritic-insensitive keyword overlap with the query
//! - Retries failed fetches with exponential backoff; a dead site never fails the check
//! - Optional canned answers for specific queries
//!
//! ## Usage
//!
//! ```sh
//! news_check --port 5000
//! curl -X POST localhost:5000/search -H 'content-type: application/json' \
//!      -d '{"query": "bóng đá Việt Nam"}'
//! ```
//!
//! ## Architecture
//!
//! Each request follows a pipeline:
//! 1. **Fetching**: Query every source's search page (concurrently by default)
//! 2. **Extraction**: Pull title/link pairs out of each page
//! 3. **Scoring**: Keep articles whose titles share words with the query
//! 4. **Verdict**: Merge, rank and report whether anything was found

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod canned;
mod cli;
mod config;
mod fetch;
mod models;
mod scoring;
mod scrapers;
mod search;
mod server;
mod sources;
mod utils;

#[cfg(test)]
mod testing;

use canned::CannedResponses;
use cli::Cli;
use config::AppConfig;
use fetch::HttpTransport;
use search::Searcher;
use server::AppState;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "news_check starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = AppConfig::from_cli(&args).await?;
    info!(
        sources = config.sources.len(),
        timeout_secs = config.timeout.as_secs(),
        max_retries = config.retry.max_retries,
        per_source_cap = config.per_source_cap,
        concurrent = config.concurrent,
        max_concurrent_sources = config.max_concurrent_sources,
        "Configuration loaded"
    );

    let canned = match config.canned_file.as_deref() {
        Some(path) => CannedResponses::load(path).await?,
        None => CannedResponses::default(),
    };
    if !canned.is_empty() {
        info!(count = canned.len(), "Canned responses enabled");
    }

    let transport = HttpTransport::new(config.timeout, config.max_body_bytes)?;
    let searcher = Searcher::new(transport, &config);
    for source in searcher.sources() {
        debug!(name = %source.name, template = %source.url_template, "Source configured");
    }

    let state = AppState {
        searcher: Arc::new(searcher),
        canned: Arc::new(canned),
    };
    server::serve(&config.host, config.port, state).await?;

    info!("news_check stopped");
    Ok(())
}
