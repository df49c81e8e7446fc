use super::{PageContent, PageSource, RenderError};
use crate::url::NormalizedUrl;
use async_trait::async_trait;
use std::sync::Arc;

/// Ordered list of page sources, tried until one succeeds
///
/// The chain always holds at least one source. Typical use is the headless
/// renderer first and the static fetcher second.
#[derive(Clone)]
pub struct FallbackChain {
    sources: Vec<Arc<dyn PageSource>>,
}

impl FallbackChain {
    /// Creates a chain with a single primary source
    pub fn new(primary: Arc<dyn PageSource>) -> Self {
        Self {
            sources: vec![primary],
        }
    }

    /// Appends a source tried after every existing one has failed
    #[must_use]
    pub fn then(mut self, fallback: Arc<dyn PageSource>) -> Self {
        self.sources.push(fallback);
        self
    }

    /// Names of the sources in the order they are tried
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Returns the first successful load
    ///
    /// # Returns
    ///
    /// * `Ok(PageContent)` - content from the first source that succeeded
    /// * `Err(RenderError)` - the error of the last source, once all failed
    pub async fn try_in_order(
        &self,
        url: &NormalizedUrl,
        origin: &str,
    ) -> Result<PageContent, RenderError> {
        let mut last_error = None;

        for (position, source) in self.sources.iter().enumerate() {
            match source.load(url, origin).await {
                Ok(content) => {
                    if position > 0 {
                        tracing::info!("Served {} via fallback source {}", url, source.name());
                    }
                    return Ok(content);
                }
                Err(e) => {
                    tracing::warn!("Source {} failed for {}: {}", source.name(), url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RenderError::Session("no page source configured".to_string())))
    }
}

#[async_trait]
impl PageSource for FallbackChain {
    fn name(&self) -> &'static str {
        "fallback-chain"
    }

    async fn load(&self, url: &NormalizedUrl, origin: &str) -> Result<PageContent, RenderError> {
        self.try_in_order(url, origin).await
    }
}
