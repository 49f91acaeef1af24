//! Error type shared by the collaborators around the extraction core.
//!
//! Extraction itself never fails: selectors that do not match, timestamps
//! that do not parse and pages that look gated all resolve to "no result".
//! Errors only come from the edges (configuration, navigation, storage).

use thiserror::Error;

/// The error type for fallible operations in this crate.
#[derive(Debug, Error)]
pub enum NewsError {
    /// The run is misconfigured and cannot start.
    #[error("configuration error: {0}")]
    Config(String),

    /// The tabular source has no header with this name.
    #[error("input is missing required column `{0}`")]
    MissingColumn(&'static str),

    /// An HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unsuccessful status code.
    #[error("unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned it.
        url: String,
    },

    /// A local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The local CSV input could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Navigation was refused because the URL points at a sub-resource.
    #[error("refusing to load sub-resource {0}")]
    BlockedResource(String),

    /// The headless browser failed to launch, navigate or answer.
    #[error("browser error: {0}")]
    Browser(String),

    /// A navigation or request exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl NewsError {
    /// True for errors that must abort the run before any scraping starts.
    pub fn is_config(&self) -> bool {
        matches!(self, NewsError::Config(_) | NewsError::MissingColumn(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_names_column() {
        let e = NewsError::MissingColumn("Symbol");
        assert_eq!(e.to_string(), "input is missing required column `Symbol`");
        assert!(e.is_config());
    }

    #[test]
    fn test_navigation_errors_are_not_config() {
        let e = NewsError::Status {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert!(!e.is_config());
        assert!(e.to_string().contains("503"));
    }
}
