//! Small DOM helpers over `scraper` trees.
//!
//! A static document has no layout engine, so "visible" is approximated from
//! markup: `hidden`, inline `display:none` / `visibility:hidden`, and
//! non-rendered tags, on the element or any ancestor. `aria-hidden` only
//! hides from assistive technology; such elements still render.

use scraper::node::Node;
use scraper::ElementRef;

const NON_RENDERED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

fn hides_itself(el: ElementRef<'_>) -> bool {
    let v = el.value();
    if NON_RENDERED_TAGS.contains(&v.name()) || v.attr("hidden").is_some() {
        return true;
    }
    match v.attr("style") {
        Some(style) => {
            let compact: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            compact.contains("display:none") || compact.contains("visibility:hidden")
        }
        None => false,
    }
}

/// Whether the element would participate in layout.
pub fn is_visible(el: ElementRef<'_>) -> bool {
    !hides_itself(el) && el.ancestors().filter_map(ElementRef::wrap).all(|a| !hides_itself(a))
}

/// Text of the element, skipping hidden subtrees.
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(el, &mut out);
    out
}

fn push_visible_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !hides_itself(child_el) {
                        push_visible_text(child_el, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(css).unwrap()).next().unwrap()
    }

    #[test]
    fn test_hidden_ancestor_hides_descendant() {
        let doc = Html::parse_document(
            r#"<div style="display: none"><p id="inner">secret</p></div><p id="shown">open</p>"#,
        );
        assert!(!is_visible(first(&doc, "#inner")));
        assert!(is_visible(first(&doc, "#shown")));
    }

    #[test]
    fn test_visible_text_skips_hidden_children() {
        let doc = Html::parse_document(
            r#"<div id="c">Hello <span hidden>cruel</span><span style="visibility: hidden">x</span>world</div>"#,
        );
        assert_eq!(visible_text(first(&doc, "#c")), "Hello world");
    }

    #[test]
    fn test_aria_hidden_still_renders() {
        let doc = Html::parse_document(
            r#"<div aria-hidden="true"><p id="overlay">Subscribe to continue reading</p></div>"#,
        );
        assert!(is_visible(first(&doc, "#overlay")));
        assert_eq!(visible_text(first(&doc, "div")), "Subscribe to continue reading");
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  a \n\t b  "), "a b");
        assert_eq!(squash_whitespace("   "), "");
    }
}
