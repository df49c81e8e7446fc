//! Chromium render engine backed by `chromiumoxide`
//!
//! One browser process is shared by all sessions. Every session is its own
//! tab with request interception enabled through the CDP Fetch domain.

use super::engine::{RenderEngine, RenderSession, RequestFilter};
use super::RenderError;
use crate::url::{RequestInfo, ResourceType};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType as CdpResourceType};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const VIEWPORT_WIDTH: u32 = 1280;
const VIEWPORT_HEIGHT: u32 = 800;

/// Headless Chromium engine
pub struct ChromiumEngine {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
}

impl ChromiumEngine {
    /// Launches a browser process
    ///
    /// # Arguments
    ///
    /// * `headless` - Run without a visible window
    /// * `user_agent` - User agent sent with every request
    pub async fn launch(headless: bool, user_agent: &str) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder()
            .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                ..Viewport::default()
            })
            .arg(format!("--user-agent={}", user_agent))
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--mute-audio");

        if !headless {
            builder = builder.with_head();
        }

        let config = builder.build().map_err(RenderError::Session)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Session(format!("failed to launch Chromium: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {:?}", e);
                }
            }
            tracing::debug!("Browser event handler finished");
        });

        tracing::info!("Launched Chromium (headless: {})", headless);

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
        })
    }
}

impl Drop for ChromiumEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn open_session(
        &self,
        filter: RequestFilter,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Session(e.to_string()))?;

        let interceptor = match start_interception(&page, filter).await {
            Ok(interceptor) => interceptor,
            Err(e) => {
                if let Err(close_err) = page.close().await {
                    tracing::debug!("Failed to close tab after setup error: {}", close_err);
                }
                return Err(e);
            }
        };

        Ok(Box::new(ChromiumSession {
            page,
            interceptor,
            closed: false,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        let mut browser = self.browser.lock().await;

        browser
            .close()
            .await
            .map_err(|e| RenderError::Session(e.to_string()))?;
        if let Err(e) = browser.wait().await {
            tracing::debug!("Waiting for Chromium to exit failed: {}", e);
        }

        self.handler.abort();
        tracing::info!("Chromium shut down");
        Ok(())
    }
}

/// Pauses every request of `page` and lets `filter` decide its fate
async fn start_interception(
    page: &Page,
    filter: RequestFilter,
) -> Result<JoinHandle<()>, RenderError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| RenderError::Session(e.to_string()))?;

    let tab = page.clone();
    let interceptor = tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request = RequestInfo::new(
                event.request.url.clone(),
                map_resource_type(&event.resource_type),
            );

            let outcome = if filter(&request) {
                tab.execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ())
            } else {
                tracing::trace!("Blocked {:?} request {}", request.resource_type, request.url);
                tab.execute(FailRequestParams::new(
                    event.request_id.clone(),
                    ErrorReason::BlockedByClient,
                ))
                .await
                .map(|_| ())
            };

            if let Err(e) = outcome {
                tracing::debug!("Interception reply for {} failed: {}", request.url, e);
            }
        }
    });

    if let Err(e) = page.execute(EnableParams::default()).await {
        interceptor.abort();
        return Err(RenderError::Session(format!(
            "failed to enable request interception: {}",
            e
        )));
    }

    Ok(interceptor)
}

fn map_resource_type(resource_type: &CdpResourceType) -> ResourceType {
    match resource_type {
        CdpResourceType::Document => ResourceType::Document,
        CdpResourceType::Stylesheet => ResourceType::Stylesheet,
        CdpResourceType::Image => ResourceType::Image,
        CdpResourceType::Media => ResourceType::Media,
        CdpResourceType::Font => ResourceType::Font,
        CdpResourceType::Script => ResourceType::Script,
        CdpResourceType::Xhr => ResourceType::Xhr,
        CdpResourceType::Fetch => ResourceType::Fetch,
        CdpResourceType::WebSocket => ResourceType::WebSocket,
        _ => ResourceType::Other,
    }
}

struct ChromiumSession {
    page: Page,
    interceptor: JoinHandle<()>,
    closed: bool,
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.interceptor.abort();
        if self.closed {
            return;
        }

        // Dropped without close(): the tab would otherwise outlive the session
        let page = self.page.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = page.close().await {
                        tracing::debug!("Failed to close abandoned tab: {}", e);
                    }
                });
            }
            Err(_) => tracing::warn!("Render session dropped outside a runtime, tab left open"),
        }
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(RenderError::timeout(url, timeout)),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, RenderError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| RenderError::Evaluate(e.to_string()))?
            .into_value::<serde_json::Value>()
            .map_err(|e| RenderError::Evaluate(e.to_string()))
    }

    async fn close(mut self: Box<Self>) -> Result<(), RenderError> {
        self.interceptor.abort();
        self.closed = true;
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| RenderError::Session(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_resource_type() {
        assert_eq!(
            map_resource_type(&CdpResourceType::Stylesheet),
            ResourceType::Stylesheet
        );
        assert_eq!(map_resource_type(&CdpResourceType::Document), ResourceType::Document);
        assert_eq!(map_resource_type(&CdpResourceType::Ping), ResourceType::Other);
        assert!(map_resource_type(&CdpResourceType::Manifest).is_blocked());
    }
}
