//! Collapse cards a listing renders more than once.

use crate::models::ExtractedArticle;
use itertools::Itertools;

/// Keep the first article per `(headline, timestamp, symbol)`, in order.
pub fn dedupe(articles: Vec<ExtractedArticle>) -> Vec<ExtractedArticle> {
    articles.into_iter().unique_by(ExtractedArticle::dedup_key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(headline: &str, timestamp: &str, symbol: &str, link: &str) -> ExtractedArticle {
        ExtractedArticle {
            headline: headline.to_string(),
            provider: "Reuters".to_string(),
            timestamp: timestamp.to_string(),
            link: link.to_string(),
            symbol: symbol.to_string(),
        }
    }

    fn sample() -> Vec<ExtractedArticle> {
        vec![
            article("A", "t1", "AAPL", "https://x/1"),
            article("B", "t1", "AAPL", "https://x/2"),
            article("A", "t1", "AAPL", "https://x/3"),
            article("A", "t2", "AAPL", "https://x/4"),
            article("A", "t1", "MSFT", "https://x/5"),
            article("B", "t1", "AAPL", "https://x/6"),
        ]
    }

    #[test]
    fn test_keeps_first_occurrence_in_order() {
        let links: Vec<_> = dedupe(sample()).into_iter().map(|a| a.link).collect();
        assert_eq!(links, vec!["https://x/1", "https://x/2", "https://x/4", "https://x/5"]);
    }

    #[test]
    fn test_idempotent() {
        let once = dedupe(sample());
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
