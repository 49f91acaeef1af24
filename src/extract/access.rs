//! Login / subscription wall detection.
//!
//! Three heuristics: an allow-list of open providers short-circuits to
//! "accessible"; otherwise the page is gated if visible text carries a
//! paywall phrase or the markup carries paywall UI.

use super::dom::{is_visible, visible_text};
use super::selectors::{contains_any_phrase, AccessRules};
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Verdict used when the gate itself cannot be evaluated.
///
/// `false` means a possibly-readable article is fetched rather than dropped.
pub const FAIL_OPEN_RESULT: bool = false;

fn parse(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("{css}: {e}"))
}

fn from_open_provider(document: &Html, rules: &AccessRules) -> Result<bool, String> {
    for css in rules.provider_selectors {
        let selector = parse(css)?;
        for el in document.select(&selector) {
            let text = el.text().collect::<String>().to_lowercase();
            if let Some(name) = rules.open_providers.iter().find(|p| text.contains(**p)) {
                debug!(provider = name, "Open provider; skipping paywall scan");
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn has_visible_paywall_text(document: &Html, rules: &AccessRules) -> Result<bool, String> {
    let containers = parse(rules.text_containers)?;
    Ok(document
        .select(&containers)
        .filter(|el| is_visible(*el))
        .any(|el| contains_any_phrase(&visible_text(el), rules.paywall_phrases)))
}

fn has_paywall_markup(document: &Html, rules: &AccessRules) -> Result<bool, String> {
    for css in rules.structural_indicators {
        if document.select(&parse(css)?).next().is_some() {
            debug!(indicator = css, "Paywall markup present");
            return Ok(true);
        }
    }
    Ok(false)
}

fn evaluate(document: &Html, rules: &AccessRules) -> Result<bool, String> {
    if from_open_provider(document, rules)? {
        return Ok(false);
    }
    Ok(has_visible_paywall_text(document, rules)? || has_paywall_markup(document, rules)?)
}

/// Whether the document sits behind a login or subscription wall.
pub fn requires_login(document: &Html, rules: &AccessRules) -> bool {
    match evaluate(document, rules) {
        Ok(gated) => gated,
        Err(e) => {
            warn!(error = %e, fallback = FAIL_OPEN_RESULT, "Access gate evaluation failed");
            FAIL_OPEN_RESULT
        }
    }
}
