//! # Ticker News Relay
//!
//! Visits per-symbol news listing pages, keeps the recent and publicly
//! readable articles, and relays their bodies to a content-storage API.
//!
//! ## Usage
//!
//! ```sh
//! ticker_news_relay --sheet-id SHEET --google-api-key KEY --publish-url https://api.example.com/articles
//! ```
//!
//! Pages are rendered in headless Chrome by default; `--static` switches to
//! plain HTTP fetches for server-rendered listings.
//!
//! ## Architecture
//!
//! The run is a single sequential pipeline:
//! 1. **Targets**: read `(Scrap_Link, Symbol, Stock name)` rows from a sheet or CSV
//! 2. **Listing**: load each symbol's listing page and extract recent, unique cards
//! 3. **Article**: load each card's page, drop gated or restricted ones, extract the body
//! 4. **Storage**: post articles inside the storage window to the endpoint
//!
//! Per-target and per-article failures are logged and skipped. Only bad
//! configuration makes the process exit non-zero.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod browser;
mod chrome;
mod cli;
mod error;
mod extract;
mod models;
mod pipeline;
mod publish;
mod sheet;
#[cfg(test)]
mod testing;
mod utils;

use browser::{Browser, HttpBrowser};
use chrome::ChromeBrowser;
use cli::Cli;
use error::NewsError;
use pipeline::{PipelineConfig, RunSummary};
use publish::{DryRunPublisher, HttpPublisher};
use sheet::{CsvSource, GoogleSheetSource, TargetSource};

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

    let start_time = std::time::Instant::now();
    info!("ticker_news_relay starting up");

    let args = Cli::parse();
    debug!(?args.sheet_id, ?args.targets_csv, dry_run = args.dry_run, "Parsed CLI arguments");

    let config = args.pipeline_config();
    let result = if let Some(path) = &args.targets_csv {
        execute(&CsvSource::new(path), &args, &config).await
    } else if let Some(sheet_id) = &args.sheet_id {
        let source = GoogleSheetSource::new(sheet_id.clone(), args.sheet_tab.clone(), args.google_api_key.clone())?;
        execute(&source, &args, &config).await
    } else {
        Err(NewsError::Config(
            "no target source: set --targets-csv or --sheet-id".to_string(),
        ))
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, config = e.is_config(), "Run aborted before scraping");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        targets = summary.targets,
        targets_failed = summary.targets_failed,
        found = summary.articles.found,
        stored = summary.articles.stored,
        skipped = summary.articles.skipped,
        stale = summary.articles.stale,
        not_stored = summary.articles.not_stored,
        failed = summary.articles.failed,
        "Execution complete"
    );

    Ok(())
}

/// Build the browser, then run over `source`.
async fn execute<S: TargetSource>(
    source: &S,
    args: &Cli,
    config: &PipelineConfig,
) -> Result<RunSummary, NewsError> {
    if args.static_pages {
        info!("Static mode; pages are fetched without rendering");
        return execute_with(source, &HttpBrowser::new()?, args, config).await;
    }
    let browser = ChromeBrowser::launch(args.chrome_path.clone()).await?;
    execute_with(source, &browser, args, config).await
}

/// Build the publisher, then run the pipeline.
async fn execute_with<S: TargetSource, B: Browser>(
    source: &S,
    browser: &B,
    args: &Cli,
    config: &PipelineConfig,
) -> Result<RunSummary, NewsError> {
    if args.dry_run {
        info!("Dry run; articles will be logged, not published");
        return pipeline::run(source, browser, &DryRunPublisher, config).await;
    }

    let publisher = HttpPublisher::new(
        args.publish_url.clone(),
        args.publish_token.clone(),
        Duration::from_secs(args.publish_timeout_secs),
    )?;
    pipeline::run(source, browser, &publisher, config).await
}
