//! Tabular input: which symbols to scrape and where their listings live.
//!
//! Rows are keyed by header names, not positions, so columns can be moved
//! around in the sheet. The three required headers are [`COL_LINK`],
//! [`COL_SYMBOL`] and [`COL_NAME`]; missing any of them is fatal.

use crate::error::NewsError;
use crate::models::StockTarget;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const COL_LINK: &str = "Scrap_Link";
pub const COL_SYMBOL: &str = "Symbol";
pub const COL_NAME: &str = "Stock name";

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Anything that yields a header row followed by data rows.
pub trait TargetSource {
    async fn rows(&self) -> Result<Vec<Vec<String>>, NewsError>;
}

/// Map raw rows to targets.
///
/// Empty input yields no targets. Rows without a link are dropped; short
/// rows read missing cells as empty.
pub fn parse_targets(rows: Vec<Vec<String>>) -> Result<Vec<StockTarget>, NewsError> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let column = |name: &'static str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(NewsError::MissingColumn(name))
    };
    let link_idx = column(COL_LINK)?;
    let symbol_idx = column(COL_SYMBOL)?;
    let name_idx = column(COL_NAME)?;

    let cell = |row: &[String], idx: usize| row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default();

    let targets: Vec<StockTarget> = rows
        .filter_map(|row| {
            let listing_url = cell(&row, link_idx);
            if listing_url.is_empty() {
                return None;
            }
            Some(StockTarget {
                symbol: cell(&row, symbol_idx),
                display_name: cell(&row, name_idx),
                listing_url,
            })
        })
        .collect();
    Ok(targets)
}

/// Read and validate targets from a source.
#[instrument(level = "info", skip_all)]
pub async fn load_targets<S: TargetSource>(source: &S) -> Result<Vec<StockTarget>, NewsError> {
    let rows = source.rows().await?;
    debug!(rows = rows.len(), "Fetched input rows");
    let targets = parse_targets(rows)?;
    info!(count = targets.len(), "Loaded stock targets");
    Ok(targets)
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// A Google Sheets tab read through the values API.
#[derive(Debug, Clone)]
pub struct GoogleSheetSource {
    client: Client,
    base_url: String,
    sheet_id: String,
    tab: String,
    api_key: Option<String>,
}

impl GoogleSheetSource {
    pub fn new(sheet_id: String, tab: String, api_key: Option<String>) -> Result<Self, NewsError> {
        Self::with_base_url(SHEETS_API_BASE.to_string(), sheet_id, tab, api_key)
    }

    /// Point at a different API host (used by tests).
    pub fn with_base_url(
        base_url: String,
        sheet_id: String,
        tab: String,
        api_key: Option<String>,
    ) -> Result<Self, NewsError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url,
            sheet_id,
            tab,
            api_key,
        })
    }

    fn values_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.sheet_id),
            urlencoding::encode(&self.tab)
        )
    }
}

impl TargetSource for GoogleSheetSource {
    #[instrument(level = "info", skip_all, fields(sheet = %self.sheet_id, tab = %self.tab))]
    async fn rows(&self) -> Result<Vec<Vec<String>>, NewsError> {
        let url = self.values_url();
        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }
}

/// A local CSV file whose first record is the header.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TargetSource for CsvSource {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn rows(&self) -> Result<Vec<Vec<String>>, NewsError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}
