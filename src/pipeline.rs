//! Per-run orchestration: targets → listing pages → articles → storage.
//!
//! Everything runs in sequence. A failing target or article is logged and
//! skipped; only loading the targets can abort the run. Pacing between
//! articles and targets is a fixed sleep.

use crate::browser::{Browser, Page};
use crate::error::NewsError;
use crate::extract::articles::extract_articles;
use crate::extract::content::{read_article_body, ContentTiming};
use crate::extract::recency::{is_recent, publish_date};
use crate::extract::selectors::{ContentSelectors, ListingSelectors};
use crate::models::{ExtractedArticle, PublishPayload, StockTarget};
use crate::publish::{PublishOutcome, Publisher};
use crate::sheet::{load_targets, TargetSource};
use scraper::Html;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Timeouts, delays and windows for a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub listing_timeout: Duration,
    pub article_timeout: Duration,
    /// Wait after a listing loads, before scrolling.
    pub listing_settle: Duration,
    pub content: ContentTiming,
    pub article_pause: Duration,
    pub target_pause: Duration,
    /// Maximum card age, in days, on listing pages.
    pub listing_window_days: u32,
    /// Maximum article age, in days, at storage. Stricter than the listing
    /// window.
    pub storage_window_days: u32,
    /// Only scrape these symbols (case-insensitive). Empty means all.
    pub symbols: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            listing_timeout: Duration::from_secs(60),
            article_timeout: Duration::from_secs(30),
            listing_settle: Duration::from_secs(3),
            content: ContentTiming {
                settle: Duration::from_secs(2),
                selector_wait: Duration::from_secs(3),
            },
            article_pause: Duration::from_secs(2),
            target_pause: Duration::from_secs(5),
            listing_window_days: 3,
            storage_window_days: 1,
            symbols: Vec::new(),
        }
    }
}

/// Counters for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetSummary {
    /// Articles extracted from the listing.
    pub found: usize,
    pub stored: usize,
    /// No link, gated, restricted or bodiless.
    pub skipped: usize,
    /// Outside the storage window.
    pub stale: usize,
    /// Publish failed or had nowhere to go.
    pub not_stored: usize,
    /// Article page failed to load.
    pub failed: usize,
}

impl TargetSummary {
    fn absorb(&mut self, other: &TargetSummary) {
        self.found += other.found;
        self.stored += other.stored;
        self.skipped += other.skipped;
        self.stale += other.stale;
        self.not_stored += other.not_stored;
        self.failed += other.failed;
    }
}

/// Counters for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub targets: usize,
    /// Targets whose listing page could not be loaded.
    pub targets_failed: usize,
    pub articles: TargetSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArticleOutcome {
    NavigationFailed,
    NoBody,
    Publish(PublishOutcome),
}

/// Run the pipeline over every target from `source`.
///
/// Returns an error only when targets cannot be loaded; that happens before
/// any page is opened.
#[instrument(level = "info", skip_all)]
pub async fn run<S, B, P>(
    source: &S,
    browser: &B,
    publisher: &P,
    config: &PipelineConfig,
) -> Result<RunSummary, NewsError>
where
    S: TargetSource,
    B: Browser,
    P: Publisher,
{
    let targets = select_targets(load_targets(source).await?, &config.symbols);
    let mut summary = RunSummary::default();
    if targets.is_empty() {
        info!("No targets to scrape");
        return Ok(summary);
    }

    let listing = ListingSelectors::default();
    let content = ContentSelectors::default();

    for target in &targets {
        summary.targets += 1;
        match scrape_target(target, browser, publisher, config, &listing, &content).await {
            Ok(counts) => {
                info!(
                    symbol = %target.symbol,
                    found = counts.found,
                    stored = counts.stored,
                    skipped = counts.skipped,
                    stale = counts.stale,
                    not_stored = counts.not_stored,
                    failed = counts.failed,
                    "Finished target"
                );
                summary.articles.absorb(&counts);
                sleep(config.target_pause).await;
            }
            Err(e) => {
                error!(symbol = %target.symbol, url = %target.listing_url, error = %e, "Listing failed; skipping target");
                summary.targets_failed += 1;
            }
        }
    }

    info!(
        targets = summary.targets,
        targets_failed = summary.targets_failed,
        stored = summary.articles.stored,
        skipped = summary.articles.skipped,
        "Run complete"
    );
    Ok(summary)
}

fn select_targets(targets: Vec<StockTarget>, symbols: &[String]) -> Vec<StockTarget> {
    if symbols.is_empty() {
        return targets;
    }
    targets
        .into_iter()
        .filter(|t| symbols.iter().any(|s| s.eq_ignore_ascii_case(&t.symbol)))
        .collect()
}

#[instrument(level = "info", skip_all, fields(symbol = %target.symbol, name = %target.display_name))]
async fn scrape_target<B: Browser, P: Publisher>(
    target: &StockTarget,
    browser: &B,
    publisher: &P,
    config: &PipelineConfig,
    listing: &ListingSelectors,
    content: &ContentSelectors,
) -> Result<TargetSummary, NewsError> {
    let page = browser.open(&target.listing_url, config.listing_timeout).await?;
    let discovered = discover_articles(&page, target, config, listing).await;
    page.close().await;
    let articles = discovered?;

    let mut counts = TargetSummary {
        found: articles.len(),
        ..TargetSummary::default()
    };

    for article in &articles {
        if article.link.trim().is_empty() {
            info!(headline = %article.headline, "No link; skipping article");
            counts.skipped += 1;
            continue;
        }

        match process_article(article, browser, publisher, config, content).await {
            ArticleOutcome::NavigationFailed => counts.failed += 1,
            ArticleOutcome::NoBody => counts.skipped += 1,
            ArticleOutcome::Publish(PublishOutcome::Stored) => counts.stored += 1,
            ArticleOutcome::Publish(PublishOutcome::Stale) => counts.stale += 1,
            ArticleOutcome::Publish(PublishOutcome::Skipped | PublishOutcome::Failed) => counts.not_stored += 1,
        }
        sleep(config.article_pause).await;
    }
    Ok(counts)
}

async fn discover_articles<Pg: Page>(
    page: &Pg,
    target: &StockTarget,
    config: &PipelineConfig,
    listing: &ListingSelectors,
) -> Result<Vec<ExtractedArticle>, NewsError> {
    sleep(config.listing_settle).await;
    if let Err(e) = page.scroll_to_end().await {
        warn!(error = %e, "Scrolling failed; extracting what rendered");
    }

    let html = page.html().await?;
    let base = Url::parse(page.url()).or_else(|_| Url::parse(&target.listing_url))?;
    let document = Html::parse_document(&html);
    Ok(extract_articles(
        &document,
        &base,
        listing,
        &target.symbol,
        config.listing_window_days,
    ))
}

#[instrument(level = "info", skip_all, fields(link = %article.link))]
async fn process_article<B: Browser, P: Publisher>(
    article: &ExtractedArticle,
    browser: &B,
    publisher: &P,
    config: &PipelineConfig,
    content: &ContentSelectors,
) -> ArticleOutcome {
    let page = match browser.open(&article.link, config.article_timeout).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "Article navigation failed");
            return ArticleOutcome::NavigationFailed;
        }
    };
    let body = read_article_body(&page, content, &config.content).await;
    page.close().await;

    match body {
        Some(body) => ArticleOutcome::Publish(store(article, body, publisher, config.storage_window_days).await),
        None => {
            info!(headline = %article.headline, "No readable body; skipping article");
            ArticleOutcome::NoBody
        }
    }
}

async fn store<P: Publisher>(
    article: &ExtractedArticle,
    body: String,
    publisher: &P,
    window_days: u32,
) -> PublishOutcome {
    if !is_recent(&article.timestamp, window_days) {
        info!(timestamp = %article.timestamp, window_days, "Outside storage window; not submitting");
        return PublishOutcome::Stale;
    }
    let payload = PublishPayload::new(article, body, publish_date(&article.timestamp));
    publisher.publish(&payload).await
}
