//! Page rendering and content acquisition
//!
//! A [`RenderEngine`] opens isolated [`RenderSession`]s (one browser tab each).
//! The [`RenderWorker`] drives one session per URL: navigate, scroll, extract
//! and discover links. Both the worker and the static fetcher implement
//! [`PageSource`], so a [`FallbackChain`] can try them in order.

mod engine;
mod scripts;
mod strategy;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "chromium")]
mod chromium;

pub use engine::{RenderEngine, RenderSession, RequestFilter};
pub use scripts::{scroll_step_script, EXTRACT_PAGE_SCRIPT};
pub use strategy::FallbackChain;
pub use worker::{RenderOptions, RenderWorker};

#[cfg(feature = "chromium")]
pub use chromium::ChromiumEngine;

use crate::url::NormalizedUrl;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while acquiring page content
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Failed to open render session: {0}")]
    Session(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Script evaluation failed: {0}")]
    Evaluate(String),

    #[error("Static fetch of {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse page content: {0}")]
    Parse(String),
}

impl RenderError {
    /// Builds a navigation timeout error
    pub fn timeout(url: &str, timeout: Duration) -> Self {
        RenderError::Timeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        }
    }

    /// Returns true if this error came from navigation (timeout included)
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation { .. } | Self::Timeout { .. })
    }
}

/// Output of one [`RenderWorker::render`] call
///
/// Immutable once produced. On failure `error` is set and the content fields
/// are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub url: NormalizedUrl,
    pub title: String,
    /// Serialized HTML of the cleaned body
    pub raw_html: String,
    /// Same-origin, non-noise links in DOM order
    pub discovered_links: Vec<NormalizedUrl>,
    pub error: Option<RenderError>,
}

impl PageResult {
    pub(crate) fn failed(url: &NormalizedUrl, error: RenderError) -> Self {
        Self {
            url: url.clone(),
            title: String::new(),
            raw_html: String::new(),
            discovered_links: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Which source produced a page's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Headless browser render
    Rendered,
    /// Plain HTTP fetch with static parsing
    Static,
}

/// Content ready for chunking, from whichever source succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub url: NormalizedUrl,
    pub title: String,
    /// Text handed to the chunker
    pub text: String,
    pub links: Vec<NormalizedUrl>,
    pub source: ContentSource,
}

/// Anything that can turn a URL into page content
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Loads `url`, keeping only discovered links that lie under `origin`
    async fn load(&self, url: &NormalizedUrl, origin: &str) -> Result<PageContent, RenderError>;
}
