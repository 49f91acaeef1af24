//! Listing-page extraction: one [`ExtractedArticle`] per qualifying card.

use super::dedup::dedupe;
use super::recency::is_recent;
use super::resolver::resolve;
use super::selectors::{contains_any_phrase, ListingSelectors};
use crate::models::{ExtractedArticle, UNKNOWN_PROVIDER};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Symbol logo paths, e.g. `.../crypto/XTVCBTC--big.svg` or `.../country/US.svg`.
static ICON_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(?:crypto|country|currency|symbol)/([A-Za-z0-9-]+?)(?:--big)?\.svg").unwrap()
});

/// Why a card did not become an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NoHeadline,
    RestrictedHeadline,
    NoLink,
    NoTimestamp,
    Stale,
}

/// Extract every recent, readable card from a listing page.
///
/// Cards matching several card selectors are visited once. The result is
/// deduplicated and in document order.
pub fn extract_articles(
    document: &Html,
    page_url: &Url,
    selectors: &ListingSelectors,
    fallback_symbol: &str,
    window_days: u32,
) -> Vec<ExtractedArticle> {
    let cards = match Selector::parse(&selectors.cards.join(", ")) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Card selectors do not parse; no cards extracted");
            return Vec::new();
        }
    };
    let icons = Selector::parse(selectors.icons).ok();

    let mut seen = 0usize;
    let mut articles = Vec::new();
    for card in document.select(&cards) {
        seen += 1;
        match extract_card(card, page_url, selectors, icons.as_ref(), fallback_symbol, window_days) {
            Ok(article) => articles.push(article),
            Err(reason) => debug!(?reason, card = seen, "Card rejected"),
        }
    }

    let extracted = articles.len();
    let articles = dedupe(articles);
    info!(
        cards = seen,
        extracted,
        unique = articles.len(),
        symbol = fallback_symbol,
        "Extracted listing articles"
    );
    articles
}

fn extract_card(
    card: ElementRef<'_>,
    page_url: &Url,
    selectors: &ListingSelectors,
    icons: Option<&Selector>,
    fallback_symbol: &str,
    window_days: u32,
) -> Result<ExtractedArticle, Rejection> {
    let headline = resolve(card, &selectors.headline).ok_or(Rejection::NoHeadline)?;
    if contains_any_phrase(&headline, selectors.restricted_headline_phrases) {
        return Err(Rejection::RestrictedHeadline);
    }

    let provider = resolve(card, &selectors.provider).unwrap_or_else(|| UNKNOWN_PROVIDER.to_string());
    let link = card_link(card, page_url).ok_or(Rejection::NoLink)?;

    let timestamp = resolve(card, &selectors.timestamp).ok_or(Rejection::NoTimestamp)?;
    if !is_recent(&timestamp, window_days) {
        return Err(Rejection::Stale);
    }

    let symbol = icons
        .and_then(|sel| icon_symbol(card, sel))
        .unwrap_or_else(|| fallback_symbol.to_string());

    Ok(ExtractedArticle {
        headline,
        provider,
        timestamp,
        link,
        symbol,
    })
}

/// The card's own `href`, else its first descendant anchor, else the
/// nearest enclosing anchor; resolved to an absolute http(s) URL.
fn card_link(card: ElementRef<'_>, page_url: &Url) -> Option<String> {
    let href = card
        .value()
        .attr("href")
        .or_else(|| card.select(&ANCHOR).next().and_then(|a| a.value().attr("href")))
        .or_else(|| {
            card.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "a" && el.value().attr("href").is_some())
                .and_then(|a| a.value().attr("href"))
        })?;

    let resolved = page_url.join(href.trim()).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

/// Composite ticker built from symbol icons inside the card, if any.
fn icon_symbol(card: ElementRef<'_>, icons: &Selector) -> Option<String> {
    let parts: Vec<String> = card
        .select(icons)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| ICON_PATTERN.captures(src))
        .map(|caps| caps[1].replace('-', ""))
        .collect();
    (!parts.is_empty()).then(|| parts.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn page_url() -> Url {
        Url::parse("https://news.example.com/symbols/NASDAQ-AAPL/news/").unwrap()
    }

    fn hours_ago(h: i64) -> String {
        (Utc::now() - Duration::hours(h)).to_rfc3339()
    }

    fn card(headline: &str, ts: &str, href: &str) -> String {
        format!(
            r#"<a data-qa-id="news-headline-card" href="{href}">
                 <span data-qa-id="news-headline-provider">Reuters</span>
                 <relative-time event-time="{ts}"></relative-time>
                 <div data-qa-id="news-headline-title" data-overflow-tooltip-text="{headline}">{headline}</div>
               </a>"#
        )
    }

    fn extract(html: &str) -> Vec<ExtractedArticle> {
        let doc = Html::parse_document(html);
        extract_articles(&doc, &page_url(), &ListingSelectors::default(), "AAPL", 3)
    }

    #[test]
    fn test_extracts_fields_from_card() {
        let ts = hours_ago(2);
        let articles = extract(&card("Apple hits record", &ts, "/news/apple-record/"));
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.headline, "Apple hits record");
        assert_eq!(a.provider, "Reuters");
        assert_eq!(a.timestamp, ts);
        assert_eq!(a.link, "https://news.example.com/news/apple-record/");
        assert_eq!(a.symbol, "AAPL");
    }

    #[test]
    fn test_duplicate_cards_collapse_to_one() {
        let ts = hours_ago(1);
        let html = format!(
            "{}{}",
            card("Same story", &ts, "/news/a/"),
            card("Same story", &ts, "/news/a-copy/")
        );
        let articles = extract(&html);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://news.example.com/news/a/");
    }

    #[test]
    fn test_card_matching_two_selectors_is_visited_once() {
        let ts = hours_ago(1);
        let html = format!(
            r#"<div data-name="news-item" class="card-news-1">
                 <a href="/news/x/"><h3>Visited once</h3></a>
                 <time datetime="{ts}"></time>
               </div>"#
        );
        let articles = extract(&html);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].provider, UNKNOWN_PROVIDER);
    }

    #[test]
    fn test_stale_restricted_and_untimed_cards_are_dropped() {
        let html = format!(
            "{}{}{}",
            card("Old news", &hours_ago(24 * 5), "/news/old/"),
            card("Premium: insider picks", &hours_ago(1), "/news/premium/"),
            r#"<a data-qa-id="news-headline-card" href="/news/nt/"><div data-qa-id="news-headline-title">No time</div></a>"#
        );
        assert!(extract(&html).is_empty());
    }

    #[test]
    fn test_link_from_enclosing_anchor() {
        let ts = hours_ago(1);
        let html = format!(
            r#"<a href="https://other.example.org/story"><article class="article-card">
                 <h2>Wrapped card</h2><time datetime="{ts}"></time>
               </article></a>"#
        );
        let articles = extract(&html);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://other.example.org/story");
    }

    #[test]
    fn test_card_without_link_is_dropped() {
        let ts = hours_ago(1);
        let html = format!(
            r#"<div data-name="news-item"><h3>Nowhere to go</h3><time datetime="{ts}"></time></div>"#
        );
        assert!(extract(&html).is_empty());
    }

    #[test]
    fn test_icons_override_symbol() {
        let ts = hours_ago(1);
        let html = format!(
            r#"<a data-qa-id="news-headline-card" href="/news/btc/">
                 <img src="https://logos.example.com/crypto/XTVCBTC--big.svg">
                 <img src="https://logos.example.com/country/US.svg">
                 <img src="https://cdn.example.com/provider/reuters.svg">
                 <div data-qa-id="news-headline-title">Bitcoin climbs</div>
                 <relative-time event-time="{ts}"></relative-time>
               </a>"#
        );
        let articles = extract(&html);
        assert_eq!(articles[0].symbol, "XTVCBTCUS");
    }

    #[test]
    fn test_icon_segments_keep_their_case() {
        let ts = hours_ago(1);
        let html = format!(
            r#"<a data-qa-id="news-headline-card" href="/news/brk/">
                 <img src="https://logos.example.com/symbol/brk-b.svg">
                 <div data-qa-id="news-headline-title">Berkshire letter</div>
                 <relative-time event-time="{ts}"></relative-time>
               </a>"#
        );
        let articles = extract(&html);
        assert_eq!(articles[0].symbol, "brkb");
    }
}
