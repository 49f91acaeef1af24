//! Page loading behind a small navigation interface.
//!
//! The extraction core only needs three things from a rendering layer: load
//! a URL into a queryable document, wait for a selector, and nudge lazy
//! content into the DOM. [`Browser`] and [`Page`] capture that.
//!
//! Two implementations ship. [`ChromeBrowser`](crate::chrome::ChromeBrowser)
//! drives headless Chrome and is the default. [`HttpBrowser`] fetches the raw
//! HTML with `reqwest` and serves server-rendered listings when no Chrome is
//! available (`--static`).
//!
//! # Sub-resources
//!
//! Stylesheets, images, fonts and media are never worth loading. Chrome
//! aborts them through request interception; see [`ResourceKind::BLOCKED`].
//! A plain HTTP fetch does not follow sub-resources at all, and navigation
//! to a URL that is itself one of those is refused with
//! [`NewsError::BlockedResource`].

use crate::error::NewsError;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Loads URLs into isolated pages.
pub trait Browser {
    type Page: Page;

    /// Navigate a fresh page to `url`, failing after `timeout`.
    async fn open(&self, url: &str, timeout: Duration) -> Result<Self::Page, NewsError>;
}

/// A loaded document.
pub trait Page {
    /// The URL the page ended up on after redirects.
    fn url(&self) -> &str;

    /// Serialized HTML of the current document.
    async fn html(&self) -> Result<String, NewsError>;

    /// Wait up to `timeout` for `selector` to match. Returns whether it did.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool;

    /// Scroll through the whole page so lazily rendered items load.
    async fn scroll_to_end(&self) -> Result<(), NewsError>;

    /// Release the page.
    async fn close(self);
}

/// What a URL would load, judged from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Document,
    Script,
    Stylesheet,
    Image,
    Font,
    Media,
}

impl ResourceKind {
    pub fn from_url(url: &str) -> Self {
        let path = Url::parse(url)
            .map(|u| u.path().to_ascii_lowercase())
            .unwrap_or_else(|_| url.to_ascii_lowercase());
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "css" => ResourceKind::Stylesheet,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "ico" | "avif" => ResourceKind::Image,
            "woff" | "woff2" | "ttf" | "otf" | "eot" => ResourceKind::Font,
            "mp4" | "webm" | "mp3" | "ogg" | "m3u8" => ResourceKind::Media,
            "js" | "mjs" => ResourceKind::Script,
            _ => ResourceKind::Document,
        }
    }

    /// Kinds whose loads are aborted on every page.
    pub const BLOCKED: [ResourceKind; 4] = [
        ResourceKind::Stylesheet,
        ResourceKind::Image,
        ResourceKind::Font,
        ResourceKind::Media,
    ];

    /// Loads of this kind are aborted.
    pub fn is_blocked(self) -> bool {
        Self::BLOCKED.contains(&self)
    }
}

/// [`Browser`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new() -> Result<Self, NewsError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

fn classify(e: reqwest::Error, timeout: Duration) -> NewsError {
    if e.is_timeout() {
        NewsError::Timeout(timeout)
    } else {
        NewsError::Http(e)
    }
}

impl Browser for HttpBrowser {
    type Page = HttpPage;

    #[instrument(level = "info", skip_all, fields(%url, ?timeout))]
    async fn open(&self, url: &str, timeout: Duration) -> Result<HttpPage, NewsError> {
        let kind = ResourceKind::from_url(url);
        if kind.is_blocked() {
            warn!(?kind, "Aborting sub-resource navigation");
            return Err(NewsError::BlockedResource(url.to_string()));
        }

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| classify(e, timeout))?;
        debug!(bytes = html.len(), %final_url, "Loaded page");
        Ok(HttpPage { url: final_url, html })
    }
}

/// A page fetched over HTTP. Its document never changes after load, so
/// waiting and scrolling cannot reveal anything new.
#[derive(Debug, Clone)]
pub struct HttpPage {
    url: String,
    html: String,
}

impl Page for HttpPage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn html(&self) -> Result<String, NewsError> {
        Ok(self.html.clone())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> bool {
        let Ok(selector) = Selector::parse(selector) else {
            return false;
        };
        Html::parse_document(&self.html).select(&selector).next().is_some()
    }

    async fn scroll_to_end(&self) -> Result<(), NewsError> {
        debug!(url = %self.url, "Static page; nothing to scroll");
        Ok(())
    }

    async fn close(self) {
        debug!(url = %self.url, "Closed page");
    }
}
