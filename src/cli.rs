//! Command-line interface definitions for Ticker News Relay.
//!
//! Every option can also be supplied through the environment, which is how
//! credentials reach the process when it runs from cron.

use crate::pipeline::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the Ticker News Relay application.
///
/// # Examples
///
/// ```sh
/// # Targets from a Google Sheet, articles to the storage API
/// ticker_news_relay --sheet-id 1AbC --google-api-key KEY --publish-url https://api.example.com/articles
///
/// # Targets from a local CSV, raw HTML instead of Chrome, nothing published
/// ticker_news_relay --targets-csv ./targets.csv --static --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Google Sheet holding the `Scrap_Link`, `Symbol` and `Stock name` columns
    #[arg(long, env = "SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Tab within the Google Sheet
    #[arg(long, env = "SHEET_TAB", default_value = "Sheet1")]
    pub sheet_tab: String,

    /// API key for the Google Sheets values API
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Local CSV with the same columns; takes precedence over the sheet
    #[arg(long, env = "TARGETS_CSV")]
    pub targets_csv: Option<PathBuf>,

    /// Content-storage endpoint; storage is skipped when unset
    #[arg(long, env = "PUBLISH_URL")]
    pub publish_url: Option<String>,

    /// Bearer token for the content-storage endpoint
    #[arg(long, env = "PUBLISH_TOKEN", hide_env_values = true)]
    pub publish_token: Option<String>,

    /// Log payloads instead of publishing them
    #[arg(long)]
    pub dry_run: bool,

    /// Fetch raw HTML over HTTP instead of rendering pages in Chrome
    #[arg(long = "static")]
    pub static_pages: bool,

    /// Chrome/Chromium executable; found automatically when unset
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Only scrape these symbols (repeatable)
    #[arg(long = "symbol")]
    pub symbols: Vec<String>,

    /// Maximum age in days for cards on listing pages
    #[arg(long, env = "LISTING_WINDOW_DAYS", default_value_t = 3)]
    pub listing_window_days: u32,

    /// Maximum age in days for articles sent to storage
    #[arg(long, env = "STORAGE_WINDOW_DAYS", default_value_t = 1)]
    pub storage_window_days: u32,

    /// Listing page navigation timeout
    #[arg(long, default_value_t = 60)]
    pub listing_timeout_secs: u64,

    /// Article page navigation timeout
    #[arg(long, default_value_t = 30)]
    pub article_timeout_secs: u64,

    /// Storage request timeout
    #[arg(long, default_value_t = 30)]
    pub publish_timeout_secs: u64,

    /// Pause between articles
    #[arg(long, default_value_t = 2)]
    pub article_pause_secs: u64,

    /// Pause between symbols
    #[arg(long, default_value_t = 5)]
    pub target_pause_secs: u64,
}

impl Cli {
    /// Pipeline settings derived from the arguments.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            listing_timeout: Duration::from_secs(self.listing_timeout_secs),
            article_timeout: Duration::from_secs(self.article_timeout_secs),
            listing_settle: defaults.listing_settle,
            content: defaults.content,
            article_pause: Duration::from_secs(self.article_pause_secs),
            target_pause: Duration::from_secs(self.target_pause_secs),
            listing_window_days: self.listing_window_days,
            storage_window_days: self.storage_window_days,
            symbols: self.symbols.clone(),
        }
    }
}
