//! Article body extraction with layered fallbacks.
//!
//! Order of attempts:
//!
//! 1. Access gate: a login/subscription wall ends extraction.
//! 2. Specific body selectors, in priority order, needing more than
//!    `min_specific_len` characters.
//! 3. Generic containers (`article`, `main`, ...) needing more than
//!    `min_generic_len` characters.
//!
//! A body that contains a restricted phrase is conclusive: extraction stops
//! with no result instead of trying the next candidate.

use super::access::requires_login;
use super::dom::visible_text;
use super::selectors::{contains_any_phrase, ContentSelectors};
use crate::browser::Page;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Delays applied while an article page renders.
#[derive(Debug, Clone, Copy)]
pub struct ContentTiming {
    /// Fixed wait before anything is read.
    pub settle: Duration,
    /// How long to wait for a specific body selector to appear.
    pub selector_wait: Duration,
}

enum Candidate {
    Accept(String),
    Restricted,
    Missing,
}

fn try_container(document: &Html, css: &str, min_len: usize, restricted: &[&str]) -> Candidate {
    let Ok(selector) = Selector::parse(css) else {
        debug!(selector = css, "Skipping invalid content selector");
        return Candidate::Missing;
    };
    let Some(el) = document.select(&selector).next() else {
        return Candidate::Missing;
    };

    let text = visible_text(el).trim().to_string();
    if text.chars().count() <= min_len {
        return Candidate::Missing;
    }
    if contains_any_phrase(&text, restricted) {
        return Candidate::Restricted;
    }
    Candidate::Accept(text)
}

/// Body text of a loaded article document, or `None` when it is gated,
/// restricted, or too short everywhere.
pub fn extract_body(document: &Html, selectors: &ContentSelectors) -> Option<String> {
    if requires_login(document, &selectors.access) {
        debug!("Article requires login");
        return None;
    }

    let specific = selectors.specific.iter().map(|css| (*css, selectors.min_specific_len));
    let generic = selectors.generic.iter().map(|css| (*css, selectors.min_generic_len));

    for (css, min_len) in specific.chain(generic) {
        match try_container(document, css, min_len, selectors.restricted_body_phrases) {
            Candidate::Accept(text) => {
                debug!(selector = css, chars = text.chars().count(), "Extracted article body");
                return Some(text);
            }
            Candidate::Restricted => {
                debug!(selector = css, "Body matched a restricted phrase");
                return None;
            }
            Candidate::Missing => continue,
        }
    }

    debug!("No container yielded body text");
    None
}

/// Let the page settle, then extract its body.
#[instrument(level = "info", skip_all, fields(url = %page.url()))]
pub async fn read_article_body<P: Page>(
    page: &P,
    selectors: &ContentSelectors,
    timing: &ContentTiming,
) -> Option<String> {
    sleep(timing.settle).await;

    for css in selectors.specific {
        if page.wait_for(css, timing.selector_wait).await {
            break;
        }
    }

    let html = match page.html().await {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "Could not read article document");
            return None;
        }
    };
    let document = Html::parse_document(&html);
    extract_body(&document, selectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;

    fn body(markup: &str) -> Option<String> {
        let doc = Html::parse_document(markup);
        extract_body(&doc, &ContentSelectors::default())
    }

    #[test]
    fn test_short_body_is_rejected() {
        let text = "x".repeat(40);
        assert_eq!(body(&format!(r#"<div class="article-body">{text}</div>"#)), None);
    }

    #[test]
    fn test_restricted_body_is_rejected() {
        let text = format!("{} subscribers only", "y".repeat(43));
        assert_eq!(text.chars().count(), 60);
        assert_eq!(body(&format!(r#"<div class="article-body">{text}</div>"#)), None);
    }

    #[test]
    fn test_clean_body_is_returned_trimmed() {
        let text = "z".repeat(60);
        assert_eq!(
            body(&format!("<div class=\"article-body\">\n   {text}  \n</div>")),
            Some(text)
        );
    }

    #[test]
    fn test_restricted_match_stops_search() {
        let restricted = format!("{} to read the full story", "a".repeat(60));
        let clean = "b".repeat(80);
        let markup = format!(
            r#"<div class="article-body">{restricted}</div><div class="story-body">{clean}</div>"#
        );
        assert_eq!(body(&markup), None);
    }

    #[test]
    fn test_priority_order_wins_over_document_order() {
        let first = "f".repeat(70);
        let second = "s".repeat(70);
        let markup = format!(
            r#"<div class="story-body">{second}</div><div itemprop="articleBody">{first}</div>"#
        );
        assert_eq!(body(&markup), Some(first));
    }

    #[test]
    fn test_generic_fallback_needs_more_text() {
        let short = "g".repeat(80);
        assert_eq!(body(&format!("<main>{short}</main>")), None);

        let long = "h".repeat(120);
        assert_eq!(body(&format!("<main>{long}</main>")), Some(long));
    }

    #[test]
    fn test_login_wall_short_circuits() {
        let text = "w".repeat(200);
        let markup = format!(
            r#"<div class="article-body">{text}</div><div class="paywall-modal">Sign in to continue</div>"#
        );
        assert_eq!(body(&markup), None);
    }

    #[tokio::test]
    async fn test_read_article_body_from_page() {
        let text = "r".repeat(75);
        let page = FakePage::new(
            "https://news.example.com/a",
            &format!(r#"<html><body><div class="news-content">{text}</div></body></html>"#),
        );
        let timing = ContentTiming {
            settle: Duration::ZERO,
            selector_wait: Duration::ZERO,
        };
        let got = read_article_body(&page, &ContentSelectors::default(), &timing).await;
        assert_eq!(got, Some(text));
    }
}
