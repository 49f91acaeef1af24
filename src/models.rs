//! Data models for targets, extracted articles and storage payloads.
//!
//! - [`StockTarget`]: one row of the tabular input
//! - [`ExtractedArticle`]: a card that survived listing-page extraction
//! - [`PublishPayload`]: the JSON body sent to the content-storage endpoint
//!
//! The payload uses the endpoint's PascalCase field names, hence the serde
//! renames.

use serde::{Deserialize, Serialize};

/// Provider recorded when no provider field could be resolved on a card.
pub const UNKNOWN_PROVIDER: &str = "Unknown";

/// A symbol to scrape, as read from the tabular source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockTarget {
    /// Ticker symbol, e.g. `AAPL`.
    pub symbol: String,
    /// Human readable company name.
    pub display_name: String,
    /// The per-symbol news listing page.
    pub listing_url: String,
}

/// A news card extracted from a listing page.
///
/// Only constructed once the headline, link and timestamp have been
/// validated, so every value of this type is a candidate for fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    /// The card headline.
    pub headline: String,
    /// The news provider, or [`UNKNOWN_PROVIDER`].
    pub provider: String,
    /// The raw timestamp as found on the page.
    pub timestamp: String,
    /// Absolute article URL.
    pub link: String,
    /// Ticker the article is filed under.
    pub symbol: String,
}

/// Identity used to collapse cards the page renders more than once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub headline: String,
    pub timestamp: String,
    pub symbol: String,
}

impl ExtractedArticle {
    /// The composite `(headline, timestamp, symbol)` key.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            headline: self.headline.clone(),
            timestamp: self.timestamp.clone(),
            symbol: self.symbol.clone(),
        }
    }
}

/// Body of the storage `POST`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPayload {
    #[serde(rename = "Headline")]
    pub headline: String,
    #[serde(rename = "Fullarticle")]
    pub body: String,
    #[serde(rename = "Provider")]
    pub provider: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    /// Publication date, `YYYY-MM-DD`.
    #[serde(rename = "date")]
    pub publish_date: String,
}

impl PublishPayload {
    /// Build the payload for an article whose body was extracted.
    pub fn new(article: &ExtractedArticle, body: String, publish_date: String) -> Self {
        let provider = if article.provider.trim().is_empty() {
            UNKNOWN_PROVIDER.to_string()
        } else {
            article.provider.clone()
        };
        Self {
            headline: article.headline.clone(),
            body,
            provider,
            symbol: article.symbol.clone(),
            publish_date,
        }
    }
}
