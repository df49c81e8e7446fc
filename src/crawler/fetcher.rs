//! Static HTTP fetcher used when headless rendering fails
//!
//! This module handles:
//! - Building an HTTP client with the configured user agent
//! - GET requests with error classification
//! - Turning fetched HTML into page content through the static parser

use crate::crawler::parser::{parse_html, StaticPage};
use crate::render::{ContentSource, PageContent, PageSource, RenderError};
use crate::url::{collect_crawlable_links, NormalizedUrl};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - User agent sent with every request
/// * `timeout` - Total request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP page source: no JavaScript, no interception
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, RenderError> {
        let client = build_http_client(user_agent, timeout).map_err(|e| RenderError::Fetch {
            url: String::new(),
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }

    /// Fetches the raw HTML of `url`
    ///
    /// Any non-2xx status is an error.
    pub async fn fetch(&self, url: &str) -> Result<String, RenderError> {
        let fetch_error = |message: String| RenderError::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                fetch_error("request timeout".to_string())
            } else if e.is_connect() {
                fetch_error("connection refused".to_string())
            } else {
                fetch_error(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status {
                StatusCode::NOT_FOUND => "dead link".to_string(),
                StatusCode::TOO_MANY_REQUESTS => "rate limited".to_string(),
                _ => status.canonical_reason().unwrap_or("error").to_string(),
            };
            return Err(fetch_error(format!("HTTP {} ({})", status.as_u16(), reason)));
        }

        response
            .text()
            .await
            .map_err(|e| fetch_error(format!("failed to read body: {}", e)))
    }

    /// Parses fetched HTML into title, body text and links
    pub fn parse(html: &str, base_url: &str) -> Result<StaticPage, RenderError> {
        let base_url = Url::parse(base_url).map_err(|e| RenderError::Parse(e.to_string()))?;
        Ok(parse_html(html, &base_url))
    }
}

#[async_trait]
impl PageSource for StaticFetcher {
    fn name(&self) -> &'static str {
        "static-fetch"
    }

    async fn load(&self, url: &NormalizedUrl, origin: &str) -> Result<PageContent, RenderError> {
        let html = self.fetch(url.as_str()).await?;
        let page = Self::parse(&html, url.as_str())?;
        let links = collect_crawlable_links(&page.links, origin);

        tracing::debug!(
            "Static fetch of {} yielded {} bytes of text and {} crawlable links",
            url,
            page.body_text.len(),
            links.len()
        );

        Ok(PageContent {
            url: url.clone(),
            title: page.title.clone().unwrap_or_default(),
            text: page.content_text(),
            links,
            source: ContentSource::Static,
        })
    }
}
