//! Generic fallback-chain resolution of one logical field.

use super::dom::{squash_whitespace, visible_text};
use super::selectors::SelectorChain;
use scraper::{ElementRef, Selector};
use tracing::debug;

/// Read a value from a single element: chain attributes first, then text.
///
/// Attributes are trusted over rendered text because labels are often
/// ellipsized on screen.
fn read_value(el: ElementRef<'_>, attributes: &[&str]) -> Option<String> {
    attributes
        .iter()
        .filter_map(|name| el.value().attr(name))
        .map(squash_whitespace)
        .chain(std::iter::once_with(|| squash_whitespace(&visible_text(el))))
        .find(|v| !v.is_empty())
}

/// Resolve `chain` against the descendants of `element`.
///
/// Each selector contributes its first matching descendant. The first
/// non-empty value across the chain wins. When no selector matches anything
/// and the chain allows it, the element itself is read instead. Never
/// returns an empty string.
pub fn resolve(element: ElementRef<'_>, chain: &SelectorChain) -> Option<String> {
    let mut matched_any = false;

    for css in chain.selectors {
        let selector = match Selector::parse(css) {
            Ok(s) => s,
            Err(e) => {
                debug!(field = chain.field, selector = css, error = %e, "Skipping invalid selector");
                continue;
            }
        };
        if let Some(found) = element.select(&selector).next() {
            matched_any = true;
            if let Some(value) = read_value(found, chain.attributes) {
                return Some(value);
            }
        }
    }

    if matched_any || !chain.fall_back_to_element {
        None
    } else {
        read_value(element, chain.attributes)
    }
}
