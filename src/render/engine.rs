//! Headless render capability
//!
//! These traits are the seam between the crawler and a concrete browser. The
//! Chromium implementation lives in `chromium.rs`; tests provide in-memory
//! fakes.

use super::RenderError;
use crate::url::RequestInfo;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Predicate deciding whether an intercepted request may continue
///
/// Returning `false` aborts the request. Aborted requests are not render
/// failures.
pub type RequestFilter = Arc<dyn Fn(&RequestInfo) -> bool + Send + Sync>;

/// A browser engine able to open isolated sessions
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Opens a new session with request interception driven by `filter`
    async fn open_session(&self, filter: RequestFilter)
        -> Result<Box<dyn RenderSession>, RenderError>;

    /// Shuts the engine down; no session may be opened afterwards
    async fn shutdown(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// One browser page context, owned by exactly one worker
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Navigates to `url`, failing once `timeout` elapses
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Evaluates a script in the page and returns its JSON result
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, RenderError>;

    /// Tears the session down
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}
