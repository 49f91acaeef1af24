//! Delivery of accepted articles to the content-storage endpoint.
//!
//! Storage is a single authenticated JSON `POST` per article with a fixed
//! request timeout. Failures are logged and reported as an outcome, never
//! raised: one rejected article must not stop the run, and nothing is
//! retried.
//!
//! There is no record of what was sent on earlier runs. An article still
//! inside the recency window is sent again next time, so the endpoint owns
//! idempotency.

use crate::error::NewsError;
use crate::models::PublishPayload;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// What happened to one article at the storage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The endpoint accepted the article.
    Stored,
    /// Older than the storage window; not submitted.
    Stale,
    /// Nowhere to send it (no endpoint, or dry run).
    Skipped,
    /// The request failed or was rejected.
    Failed,
}

/// Sends payloads somewhere.
pub trait Publisher {
    async fn publish(&self, payload: &PublishPayload) -> PublishOutcome;
}

/// [`Publisher`] posting JSON to the storage API.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: Client,
    endpoint: Option<String>,
    token: Option<String>,
    timeout: Duration,
}

impl HttpPublisher {
    pub fn new(endpoint: Option<String>, token: Option<String>, timeout: Duration) -> Result<Self, NewsError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
            token: token.filter(|t| !t.trim().is_empty()),
            timeout,
        })
    }

    async fn send(&self, endpoint: &str, payload: &PublishPayload) -> Result<(), NewsError> {
        let mut request = self.client.post(endpoint).timeout(self.timeout).json(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NewsError::Timeout(self.timeout)
            } else {
                NewsError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %truncate_for_log(&body, 200), "Storage rejected article");
            return Err(NewsError::Status {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }
        Ok(())
    }
}

impl Publisher for HttpPublisher {
    #[instrument(level = "info", skip_all, fields(symbol = %payload.symbol, date = %payload.publish_date))]
    async fn publish(&self, payload: &PublishPayload) -> PublishOutcome {
        let Some(endpoint) = self.endpoint.as_deref() else {
            warn!(headline = %payload.headline, "No publish URL configured; skipping storage");
            return PublishOutcome::Skipped;
        };

        match self.send(endpoint, payload).await {
            Ok(()) => {
                info!(headline = %payload.headline, "Stored article");
                PublishOutcome::Stored
            }
            Err(e) => {
                error!(headline = %payload.headline, error = %e, "Article not stored");
                PublishOutcome::Failed
            }
        }
    }
}

/// [`Publisher`] that only logs what would be sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPublisher;

impl Publisher for DryRunPublisher {
    async fn publish(&self, payload: &PublishPayload) -> PublishOutcome {
        info!(
            symbol = %payload.symbol,
            provider = %payload.provider,
            date = %payload.publish_date,
            headline = %payload.headline,
            body = %truncate_for_log(&payload.body, 120),
            "Dry run; not publishing"
        );
        PublishOutcome::Skipped
    }
}
