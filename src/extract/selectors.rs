//! Selector chains and phrase lists driving the extraction heuristics.
//!
//! Listing and article markup is not ours and changes without notice, so
//! every logical field carries an ordered list of candidate selectors. Live
//! and legacy shapes sit side by side; the first one that yields a value
//! wins. Tune these lists, not the algorithms that consume them.

/// Attribute holding the untruncated text of an ellipsized label.
pub const TOOLTIP_ATTR: &str = "data-overflow-tooltip-text";

/// Ordered candidate selectors for one logical field.
#[derive(Debug, Clone, Copy)]
pub struct SelectorChain {
    /// Field name, for logs.
    pub field: &'static str,
    /// CSS selectors tried in order against the card's descendants.
    pub selectors: &'static [&'static str],
    /// Attributes read, in order, before falling back to visible text.
    pub attributes: &'static [&'static str],
    /// Read the card itself when no selector matched any descendant.
    pub fall_back_to_element: bool,
}

const LABEL_ATTRIBUTES: &[&str] = &[TOOLTIP_ATTR, "title"];

/// Selectors for listing pages.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    /// Any of these marks an article card. Applied as one union.
    pub cards: &'static [&'static str],
    pub headline: SelectorChain,
    pub provider: SelectorChain,
    pub timestamp: SelectorChain,
    /// Image elements that may carry a symbol icon.
    pub icons: &'static str,
    /// Headlines containing any of these (case-insensitive) are dropped.
    pub restricted_headline_phrases: &'static [&'static str],
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            cards: &[
                "a[data-qa-id=\"news-headline-card\"]",
                "[class*=\"card-\"][class*=\"news\"]",
                "article[class*=\"article-\"]",
                "div[data-name=\"news-item\"]",
                "li[class*=\"news-item\"]",
            ],
            headline: SelectorChain {
                field: "headline",
                selectors: &[
                    "[data-qa-id=\"news-headline-title\"]",
                    "[class*=\"title-\"]",
                    "[data-name=\"news-headline\"]",
                    "h3",
                    "h2",
                    ".title",
                ],
                attributes: LABEL_ATTRIBUTES,
                fall_back_to_element: true,
            },
            provider: SelectorChain {
                field: "provider",
                selectors: &[
                    "[data-qa-id=\"news-headline-provider\"]",
                    "[class*=\"provider-\"]",
                    "[data-name=\"news-provider\"]",
                    ".source",
                    ".provider",
                ],
                attributes: LABEL_ATTRIBUTES,
                fall_back_to_element: false,
            },
            timestamp: SelectorChain {
                field: "timestamp",
                selectors: &["relative-time", "time", "[event-time]", "[data-timestamp]", "[class*=\"date-\"]"],
                attributes: &["event-time", "datetime", "data-timestamp", "timestamp", "title"],
                fall_back_to_element: true,
            },
            icons: "img[src]",
            restricted_headline_phrases: &[
                "premium",
                "subscribers only",
                "for subscribers",
                "exclusive content",
                "members only",
            ],
        }
    }
}

/// Selectors for article pages.
#[derive(Debug, Clone)]
pub struct ContentSelectors {
    /// Body containers in priority order; text must exceed
    /// [`ContentSelectors::min_specific_len`].
    pub specific: &'static [&'static str],
    /// Generic containers tried when nothing specific qualified; text must
    /// exceed [`ContentSelectors::min_generic_len`].
    pub generic: &'static [&'static str],
    pub min_specific_len: usize,
    pub min_generic_len: usize,
    /// Body text containing any of these (case-insensitive) is rejected.
    pub restricted_body_phrases: &'static [&'static str],
    pub access: AccessRules,
}

impl Default for ContentSelectors {
    fn default() -> Self {
        Self {
            specific: &[
                "[data-qa-id=\"news-description-text\"]",
                "[class*=\"body-\"][class*=\"article\"]",
                "[class*=\"articleBody\"]",
                "[itemprop=\"articleBody\"]",
                ".article-body",
                ".story-body",
                ".news-content",
            ],
            generic: &[
                "article",
                "main",
                "[role=\"main\"]",
                ".content",
                ".article-content",
                ".post-content",
                ".entry-content",
            ],
            min_specific_len: 50,
            min_generic_len: 100,
            restricted_body_phrases: &[
                "subscribe to read",
                "subscribe to continue",
                "subscribers only",
                "sign in to continue reading",
                "log in to read the full article",
                "this article is for premium members",
                "to read the full story",
            ],
            access: AccessRules::default(),
        }
    }
}

/// Rules for the login/subscription gate.
#[derive(Debug, Clone)]
pub struct AccessRules {
    /// Elements naming the article's provider.
    pub provider_selectors: &'static [&'static str],
    /// Providers known to publish openly (lower-case substrings).
    pub open_providers: &'static [&'static str],
    /// Tag names whose visible text is scanned for paywall phrases.
    pub text_containers: &'static str,
    pub paywall_phrases: &'static [&'static str],
    /// Paywall/login UI selectors, matched regardless of visibility.
    pub structural_indicators: &'static [&'static str],
}

impl Default for AccessRules {
    fn default() -> Self {
        Self {
            provider_selectors: &[
                "[data-qa-id=\"news-story-provider\"]",
                "[class*=\"provider\"]",
                "[class*=\"source\"]",
                "[rel=\"author\"]",
            ],
            open_providers: &[
                "reuters",
                "tradingview",
                "benzinga",
                "zacks",
                "gurufocus",
                "globenewswire",
                "business wire",
                "pr newswire",
                "accesswire",
            ],
            text_containers: "div, p, span, section, aside, h1, h2, h3, h4",
            paywall_phrases: &[
                "subscribe to continue",
                "subscribe to read",
                "sign in to continue",
                "log in to continue",
                "login to continue",
                "create a free account to",
                "already a subscriber",
                "this content is for subscribers",
                "unlock this article",
                "become a member to read",
            ],
            structural_indicators: &[
                "[class*=\"paywall\"]",
                "[id*=\"paywall\"]",
                "[data-paywall]",
                "[class*=\"regwall\"]",
                "[class*=\"subscription-wall\"]",
                "[class*=\"login-wall\"]",
                "[class*=\"premium-lock\"]",
                "[data-qa-id=\"news-paywall\"]",
            ],
        }
    }
}

/// Case-insensitive check of `text` against a lower-case phrase list.
pub fn contains_any_phrase(text: &str, phrases: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    phrases.iter().any(|p| lowered.contains(p))
}
