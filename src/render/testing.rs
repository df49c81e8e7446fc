//! In-memory render engine for tests

use super::engine::{RenderEngine, RenderSession, RequestFilter};
use super::RenderError;
use crate::url::{RequestInfo, ResourceType};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A page served by [`FakeEngine`]
#[derive(Clone)]
pub(crate) struct FakePage {
    pub title: String,
    pub html: String,
    pub links: Vec<String>,
}

impl FakePage {
    pub(crate) fn new(title: &str, html: &str, links: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            html: html.to_string(),
            links: links.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// In-memory engine: URLs absent from `pages` fail navigation
#[derive(Default)]
pub(crate) struct FakeEngine {
    pages: HashMap<String, FakePage>,
    pub opened: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
    pub visits: Arc<Mutex<Vec<String>>>,
    pub filter_probe: Mutex<Vec<bool>>,
    navigation_delay: Option<Duration>,
}

impl FakeEngine {
    pub(crate) fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Makes every navigation wait before resolving
    pub(crate) fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = Some(delay);
        self
    }
}

struct FakeSession {
    pages: HashMap<String, FakePage>,
    current: Option<FakePage>,
    closed: Arc<AtomicUsize>,
    visits: Arc<Mutex<Vec<String>>>,
    navigation_delay: Option<Duration>,
}

#[async_trait]
impl RenderEngine for FakeEngine {
    async fn open_session(
        &self,
        filter: RequestFilter,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.filter_probe.lock().unwrap().extend([
            filter(&RequestInfo::new("https://a.com/page", ResourceType::Document)),
            filter(&RequestInfo::new("https://a.com/app.css", ResourceType::Stylesheet)),
        ]);

        Ok(Box::new(FakeSession {
            pages: self.pages.clone(),
            current: None,
            closed: self.closed.clone(),
            visits: self.visits.clone(),
            navigation_delay: self.navigation_delay,
        }))
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        self.visits.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.navigation_delay {
            tokio::time::sleep(delay).await;
        }
        match self.pages.get(url) {
            Some(page) => {
                self.current = Some(page.clone());
                Ok(())
            }
            None => Err(RenderError::timeout(url, timeout)),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, RenderError> {
        if script.contains("scrollBy") {
            return Ok(json!(true));
        }

        let page = self
            .current
            .as_ref()
            .ok_or_else(|| RenderError::Evaluate("no page loaded".to_string()))?;

        Ok(json!(json!({
            "title": page.title,
            "html": page.html,
            "links": page.links,
        })
        .to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
