//! In-memory collaborators for tests.

use crate::browser::{Browser, Page};
use crate::error::NewsError;
use crate::models::PublishPayload;
use crate::publish::{PublishOutcome, Publisher};
use crate::sheet::TargetSource;
use scraper::{Html, Selector};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// Serves fixed HTML per URL; unknown URLs fail like a 404.
#[derive(Debug, Default)]
pub struct FakeBrowser {
    pages: HashMap<String, String>,
    opened: RefCell<Vec<String>>,
    closed: Rc<Cell<usize>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Every URL navigation was attempted for, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }
}

impl Browser for FakeBrowser {
    type Page = FakePage;

    async fn open(&self, url: &str, _timeout: Duration) -> Result<FakePage, NewsError> {
        self.opened.borrow_mut().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(FakePage {
                url: url.to_string(),
                html: html.clone(),
                closed: Rc::clone(&self.closed),
            }),
            None => Err(NewsError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct FakePage {
    url: String,
    html: String,
    closed: Rc<Cell<usize>>,
}

impl FakePage {
    pub fn new(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            html: html.to_string(),
            closed: Rc::new(Cell::new(0)),
        }
    }
}

impl Page for FakePage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn html(&self) -> Result<String, NewsError> {
        Ok(self.html.clone())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> bool {
        Selector::parse(selector)
            .map(|s| Html::parse_document(&self.html).select(&s).next().is_some())
            .unwrap_or(false)
    }

    async fn scroll_to_end(&self) -> Result<(), NewsError> {
        Ok(())
    }

    async fn close(self) {
        self.closed.set(self.closed.get() + 1);
    }
}

/// Records payloads and answers with queued outcomes, then `Stored`.
#[derive(Debug, Default)]
pub struct FakePublisher {
    outcomes: RefCell<VecDeque<PublishOutcome>>,
    sent: RefCell<Vec<PublishPayload>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(outcomes: &[PublishOutcome]) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.iter().copied().collect()),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<PublishPayload> {
        self.sent.borrow().clone()
    }
}

impl Publisher for FakePublisher {
    async fn publish(&self, payload: &PublishPayload) -> PublishOutcome {
        self.sent.borrow_mut().push(payload.clone());
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(PublishOutcome::Stored)
    }
}

/// Fixed rows, header first.
#[derive(Debug, Clone)]
pub struct FakeSource {
    rows: Vec<Vec<String>>,
}

impl FakeSource {
    pub fn new(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }
}

impl TargetSource for FakeSource {
    async fn rows(&self) -> Result<Vec<Vec<String>>, NewsError> {
        Ok(self.rows.clone())
    }
}
