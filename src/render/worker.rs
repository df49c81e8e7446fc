use super::engine::{RenderEngine, RenderSession, RequestFilter};
use super::scripts::{scroll_step_script, EXTRACT_PAGE_SCRIPT};
use super::{ContentSource, PageContent, PageResult, PageSource, RenderError};
use crate::config::CrawlerConfig;
use crate::url::{allow_request, collect_crawlable_links, NormalizedUrl};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Timing knobs for a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub navigation_timeout: Duration,
    pub scroll_step_px: u32,
    pub scroll_delay: Duration,
    pub max_scroll_steps: u32,
}

impl RenderOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            scroll_step_px: config.scroll_step_px,
            scroll_delay: Duration::from_millis(config.scroll_delay_ms),
            max_scroll_steps: config.max_scroll_steps,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

#[derive(Debug, Deserialize)]
struct ExtractedPage {
    #[serde(default)]
    title: String,
    #[serde(default)]
    html: String,
    #[serde(default)]
    links: Vec<String>,
}

/// Renders one URL per call in a fresh session
///
/// Each call opens its own session, so a worker can be shared by concurrent
/// tasks without sessions ever being shared.
pub struct RenderWorker {
    engine: Arc<dyn RenderEngine>,
    options: RenderOptions,
    filter: RequestFilter,
}

impl RenderWorker {
    /// Creates a worker that blocks noise requests
    pub fn new(engine: Arc<dyn RenderEngine>, options: RenderOptions) -> Self {
        Self {
            engine,
            options,
            filter: Arc::new(allow_request),
        }
    }

    /// Renders `url` and extracts its content
    ///
    /// # Steps
    ///
    /// 1. Open a session with noise requests aborted
    /// 2. Navigate with a hard timeout
    /// 3. Scroll to the bottom in fixed increments (best effort)
    /// 4. Extract the title and cleaned body HTML
    /// 5. Keep anchors that lie under `origin` and are not noise
    ///
    /// Never panics or returns early without closing the session. Failures
    /// are reported through `PageResult::error`.
    pub async fn render(&self, url: &NormalizedUrl, origin: &str) -> PageResult {
        let session = match self.engine.open_session(self.filter.clone()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Could not open session for {}: {}", url, e);
                return PageResult::failed(url, e);
            }
        };
        let mut guard = SessionGuard::new(session, url);

        let outcome = match guard.session_mut() {
            Some(session) => self.drive(session, url).await,
            None => Err(RenderError::Session("session already closed".to_string())),
        };

        guard.close().await;

        match outcome {
            Ok(page) => {
                let discovered_links = collect_crawlable_links(&page.links, origin);
                tracing::debug!(
                    "Rendered {} ({} bytes, {} crawlable links)",
                    url,
                    page.html.len(),
                    discovered_links.len()
                );

                PageResult {
                    url: url.clone(),
                    title: page.title.trim().to_string(),
                    raw_html: page.html,
                    discovered_links,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Render of {} failed: {}", url, e);
                PageResult::failed(url, e)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut dyn RenderSession,
        url: &NormalizedUrl,
    ) -> Result<ExtractedPage, RenderError> {
        session
            .goto(url.as_str(), self.options.navigation_timeout)
            .await?;

        self.auto_scroll(session, url).await;

        let value = session.evaluate(EXTRACT_PAGE_SCRIPT).await?;
        parse_extraction(value)
    }

    async fn auto_scroll(&self, session: &mut dyn RenderSession, url: &NormalizedUrl) {
        let script = scroll_step_script(self.options.scroll_step_px);

        for step in 0..self.options.max_scroll_steps {
            match session.evaluate(&script).await {
                Ok(serde_json::Value::Bool(true)) => {
                    tracing::debug!("Reached bottom of {} after {} step(s)", url, step + 1);
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Auto-scroll of {} stopped: {}", url, e);
                    return;
                }
            }

            tokio::time::sleep(self.options.scroll_delay).await;
        }
    }
}

/// Owns a session for the duration of one render
///
/// If the render future is dropped before [`SessionGuard::close`] runs, the
/// session is closed on a background task instead.
struct SessionGuard {
    session: Option<Box<dyn RenderSession>>,
    url: String,
}

impl SessionGuard {
    fn new(session: Box<dyn RenderSession>, url: &NormalizedUrl) -> Self {
        Self {
            session: Some(session),
            url: url.to_string(),
        }
    }

    fn session_mut(&mut self) -> Option<&mut dyn RenderSession> {
        match self.session.as_mut() {
            Some(session) => Some(session.as_mut()),
            None => None,
        }
    }

    async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.close().await {
                tracing::warn!("Failed to close session for {}: {}", self.url, e);
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        tracing::debug!("Render of {} cancelled, closing its session", self.url);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let url = std::mem::take(&mut self.url);
                runtime.spawn(async move {
                    if let Err(e) = session.close().await {
                        tracing::warn!("Failed to close cancelled session for {}: {}", url, e);
                    }
                });
            }
            Err(_) => tracing::warn!("No runtime left to close the session for {}", self.url),
        }
    }
}

/// Accepts the extraction result either as a JSON string or as an object
fn parse_extraction(value: serde_json::Value) -> Result<ExtractedPage, RenderError> {
    let parsed = match value {
        serde_json::Value::String(raw) => serde_json::from_str(&raw),
        other => serde_json::from_value(other),
    };

    parsed.map_err(|e| RenderError::Parse(e.to_string()))
}

#[async_trait]
impl PageSource for RenderWorker {
    fn name(&self) -> &'static str {
        "headless-render"
    }

    async fn load(&self, url: &NormalizedUrl, origin: &str) -> Result<PageContent, RenderError> {
        let result = self.render(url, origin).await;

        if let Some(error) = result.error {
            return Err(error);
        }

        Ok(PageContent {
            url: result.url,
            title: result.title,
            text: result.raw_html,
            links: result.discovered_links,
            source: ContentSource::Rendered,
        })
    }
}
