//! [`Browser`] backed by headless Chrome.
//!
//! `headless_chrome` is a blocking client, so every call into it runs on the
//! blocking pool and the async pipeline never stalls a runtime worker.
//! Each [`ChromePage`] is its own tab with request interception enabled:
//! stylesheet, image, font and media loads are failed with
//! `BlockedByClient` before they hit the network.

use crate::browser::{Browser, Page, ResourceKind};
use crate::error::NewsError;
use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::{FailRequest, RequestPattern, RequestStage};
use headless_chrome::protocol::cdp::Network::{ErrorReason, ResourceType};
use headless_chrome::{LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Upper bound on scroll steps, for pages that keep growing.
const MAX_SCROLL_STEPS: usize = 40;
const SCROLL_PAUSE: Duration = Duration::from_millis(250);

/// Scrolls one viewport down and reports whether the bottom was reached.
const SCROLL_STEP_JS: &str = "(() => { \
    window.scrollBy(0, window.innerHeight); \
    const root = document.scrollingElement || document.documentElement; \
    return window.scrollY + window.innerHeight >= root.scrollHeight - 2; \
})()";

/// Chrome keeps running between pages; only an idle gap longer than this
/// shuts it down.
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

fn chrome_error(context: &str, e: impl std::fmt::Display) -> NewsError {
    NewsError::Browser(format!("{context}: {e}"))
}

/// Run a blocking browser call off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, NewsError>
where
    F: FnOnce() -> Result<T, NewsError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| chrome_error("browser task failed", e))?
}

fn cdp_resource_type(kind: ResourceKind) -> ResourceType {
    match kind {
        ResourceKind::Document => ResourceType::Document,
        ResourceKind::Script => ResourceType::Script,
        ResourceKind::Stylesheet => ResourceType::Stylesheet,
        ResourceKind::Image => ResourceType::Image,
        ResourceKind::Font => ResourceType::Font,
        ResourceKind::Media => ResourceType::Media,
    }
}

/// Fetch patterns that pause every blocked resource kind at request stage.
fn blocked_patterns() -> Vec<RequestPattern> {
    ResourceKind::BLOCKED
        .iter()
        .map(|kind| RequestPattern {
            url_pattern: None,
            resource_Type: Some(cdp_resource_type(*kind)),
            request_stage: Some(RequestStage::Request),
        })
        .collect()
}

/// Only blocked kinds are paused, so every paused request is failed.
fn abort_request(_transport: Arc<Transport>, _session: SessionId, event: RequestPausedEvent) -> RequestPausedDecision {
    RequestPausedDecision::Fail(FailRequest {
        request_id: event.params.request_id,
        error_reason: ErrorReason::BlockedByClient,
    })
}

fn block_sub_resources(tab: &Tab) -> Result<(), NewsError> {
    let patterns = blocked_patterns();
    tab.enable_fetch(Some(patterns.as_slice()), None)
        .map_err(|e| chrome_error("enabling fetch interception", e))?;
    tab.enable_request_interception(Arc::new(abort_request))
        .map_err(|e| chrome_error("installing request interceptor", e))?;
    Ok(())
}

fn navigate(tab: &Tab, url: &str) -> Result<String, NewsError> {
    block_sub_resources(tab)?;
    tab.navigate_to(url)
        .map_err(|e| chrome_error("navigating", e))?
        .wait_until_navigated()
        .map_err(|e| chrome_error("waiting for navigation", e))?;
    Ok(tab.get_url())
}

/// A headless Chrome process shared by every page of a run.
#[derive(Clone)]
pub struct ChromeBrowser {
    chrome: headless_chrome::Browser,
}

impl ChromeBrowser {
    /// Launch Chrome, from `path` when given, else wherever it is installed.
    pub async fn launch(path: Option<PathBuf>) -> Result<Self, NewsError> {
        info!(?path, "Launching headless Chrome");
        blocking(move || {
            let options = LaunchOptions {
                headless: true,
                sandbox: false,
                path,
                idle_browser_timeout: IDLE_TIMEOUT,
                args: vec![
                    OsStr::new("--disable-blink-features=AutomationControlled"),
                    OsStr::new("--disable-dev-shm-usage"),
                    OsStr::new("--window-size=1920,1080"),
                ],
                ..Default::default()
            };
            let chrome = headless_chrome::Browser::new(options)
                .map_err(|e| chrome_error("launching Chrome (is Chrome/Chromium installed?)", e))?;
            Ok(Self { chrome })
        })
        .await
    }
}

impl Browser for ChromeBrowser {
    type Page = ChromePage;

    #[instrument(level = "info", skip_all, fields(%url, ?timeout))]
    async fn open(&self, url: &str, timeout: Duration) -> Result<ChromePage, NewsError> {
        let chrome = self.chrome.clone();
        let url = url.to_string();
        blocking(move || {
            let tab = chrome.new_tab().map_err(|e| chrome_error("opening tab", e))?;
            tab.set_default_timeout(timeout);
            match navigate(&tab, &url) {
                Ok(final_url) => {
                    debug!(%final_url, "Loaded page");
                    Ok(ChromePage { tab, url: final_url })
                }
                Err(e) => {
                    if let Err(close_err) = tab.close(false) {
                        warn!(error = %close_err, "Failed to close tab after navigation error");
                    }
                    Err(e)
                }
            }
        })
        .await
    }
}

/// One Chrome tab.
pub struct ChromePage {
    tab: Arc<Tab>,
    url: String,
}

impl Page for ChromePage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn html(&self) -> Result<String, NewsError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || tab.get_content().map_err(|e| chrome_error("reading content", e))).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool {
        let tab = Arc::clone(&self.tab);
        let selector = selector.to_string();
        blocking(move || Ok(tab.wait_for_element_with_custom_timeout(&selector, timeout).is_ok()))
            .await
            .unwrap_or(false)
    }

    async fn scroll_to_end(&self) -> Result<(), NewsError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || {
            for step in 1..=MAX_SCROLL_STEPS {
                let at_bottom = tab
                    .evaluate(SCROLL_STEP_JS, false)
                    .map_err(|e| chrome_error("scrolling", e))?
                    .value
                    .as_ref()
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(true);
                std::thread::sleep(SCROLL_PAUSE);
                if at_bottom {
                    debug!(steps = step, "Reached end of page");
                    return Ok(());
                }
            }
            debug!(steps = MAX_SCROLL_STEPS, "Stopped scrolling before the end of page");
            Ok(())
        })
        .await
    }

    async fn close(self) {
        let tab = self.tab;
        let url = self.url;
        let closed = blocking(move || tab.close(true).map_err(|e| chrome_error("closing tab", e))).await;
        match closed {
            Ok(_) => debug!(%url, "Closed page"),
            Err(e) => warn!(%url, error = %e, "Failed to close page"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_blocked_patterns_cover_blocked_kinds() {
        let patterns = blocked_patterns();
        assert_eq!(patterns.len(), ResourceKind::BLOCKED.len());
        assert!(patterns.iter().all(|p| p.url_pattern.is_none() && p.resource_Type.is_some()));
    }

    #[test]
    fn test_documents_and_scripts_are_not_paused() {
        let paused: Vec<String> = blocked_patterns()
            .iter()
            .filter_map(|p| p.resource_Type.as_ref().map(|t| format!("{t:?}")))
            .collect();
        assert!(paused.contains(&format!("{:?}", ResourceType::Image)));
        assert!(paused.contains(&format!("{:?}", ResourceType::Stylesheet)));
        assert!(!paused.contains(&format!("{:?}", ResourceType::Document)));
        assert!(!paused.contains(&format!("{:?}", ResourceType::Script)));
    }

    const LATE_ARTICLE: &str = r#"<html><head><link rel="stylesheet" href="/site.css"></head><body>
        <img src="/logo.png">
        <script>
          setTimeout(() => {
            const a = document.createElement("article");
            a.textContent = "Rendered late";
            document.body.appendChild(a);
          }, 400);
        </script></body></html>"#;

    const LAZY_LISTING: &str = r#"<html><body>
        <div style="height: 6000px">top</div>
        <div id="feed"></div>
        <script>
          window.addEventListener("scroll", () => {
            if (window.scrollY + window.innerHeight >= document.body.scrollHeight - 2
                && !document.querySelector(".lazy")) {
              const d = document.createElement("div");
              d.className = "lazy";
              document.getElementById("feed").appendChild(d);
            }
          });
        </script></body></html>"#;

    #[tokio::test]
    #[ignore = "needs a local Chrome or Chromium"]
    async fn test_wait_for_sees_script_rendered_elements() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/story/");
                then.status(200).header("content-type", "text/html").body(LATE_ARTICLE);
            })
            .await;

        let browser = ChromeBrowser::launch(None).await.unwrap();
        let page = browser.open(&server.url("/story/"), Duration::from_secs(10)).await.unwrap();

        assert!(page.wait_for("article", Duration::from_secs(5)).await);
        assert!(!page.wait_for(".never-there", Duration::from_millis(300)).await);
        assert!(page.html().await.unwrap().contains("Rendered late"));
        page.close().await;
    }

    #[tokio::test]
    #[ignore = "needs a local Chrome or Chromium"]
    async fn test_scroll_to_end_triggers_lazy_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/news/");
                then.status(200).header("content-type", "text/html").body(LAZY_LISTING);
            })
            .await;

        let browser = ChromeBrowser::launch(None).await.unwrap();
        let page = browser.open(&server.url("/news/"), Duration::from_secs(10)).await.unwrap();
        assert!(!page.html().await.unwrap().contains("class=\"lazy\""));

        page.scroll_to_end().await.unwrap();

        assert!(page.wait_for(".lazy", Duration::from_secs(2)).await);
        page.close().await;
    }
}
