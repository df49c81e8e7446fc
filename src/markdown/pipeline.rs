use super::backend::{BackendError, GeminiClient, TextGenerator};
use super::chunker::Chunk;
use super::keyring::KeyRing;
use super::prompt::{user_prompt, SYSTEM_INSTRUCTION};
use crate::config::BackendConfig;
use crate::ScrapeError;
use std::sync::Arc;
use std::time::Duration;

/// Text appended in place of a chunk whose generation failed
pub const GENERATION_FAILED_PLACEHOLDER: &str = "Error generating markdown";

/// Separator placed between the outputs of consecutive chunks
const CHUNK_SEPARATOR: &str = "\n\n";

/// Result of converting one page's chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Concatenated Markdown in chunk order
    pub markdown: String,

    /// Chunks converted successfully
    pub generated: usize,

    /// Chunks replaced by the placeholder
    pub failed: usize,
}

/// Sends chunks through a text-generation backend, one at a time
///
/// Credentials are drawn round-robin from a ring owned by this pipeline; the
/// ring advances on every attempt whether it succeeds or not. A chunk gets
/// `1 + max_retries` attempts before its output is replaced with
/// [`GENERATION_FAILED_PLACEHOLDER`].
pub struct MarkdownPipeline {
    generator: Arc<dyn TextGenerator>,
    keys: KeyRing,
    max_retries: u32,
    retry_delay: Duration,
}

impl MarkdownPipeline {
    /// Creates a pipeline over an arbitrary generator
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NoCredentials` if `keys` is empty.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        keys: Vec<String>,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Result<Self, BackendError> {
        let keys = KeyRing::new(keys).ok_or(BackendError::NoCredentials)?;
        tracing::debug!("Rotating across {} credential(s)", keys.len());

        Ok(Self {
            generator,
            keys,
            max_retries,
            retry_delay,
        })
    }

    /// Creates a Gemini-backed pipeline from the backend configuration
    ///
    /// Credentials are resolved from the literal list and the named
    /// environment variables.
    pub fn from_config(config: &BackendConfig) -> Result<Self, ScrapeError> {
        let keys = config.resolve_keys()?;
        let client = GeminiClient::new(
            &config.endpoint,
            &config.model,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        tracing::info!(
            "Markdown backend: model {} with {} credential(s)",
            config.model,
            keys.len()
        );

        Ok(Self::new(
            Arc::new(client),
            keys,
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        )?)
    }

    /// Converts chunks to Markdown, in sequence order
    ///
    /// Never fails: a chunk whose every attempt failed contributes the
    /// placeholder text and processing continues with the next chunk.
    pub async fn to_markdown(&self, chunks: &[Chunk]) -> String {
        self.convert(chunks).await.markdown
    }

    /// Same as [`Self::to_markdown`] but also reports per-chunk outcomes
    pub async fn convert(&self, chunks: &[Chunk]) -> Conversion {
        let mut parts = Vec::with_capacity(chunks.len());
        let mut generated = 0;
        let mut failed = 0;

        for chunk in chunks {
            match self.generate_chunk(chunk).await {
                Ok(text) => {
                    generated += 1;
                    parts.push(text);
                }
                Err(e) => {
                    tracing::warn!(
                        "Chunk {} ({} bytes) failed after {} attempt(s): {}",
                        chunk.index,
                        chunk.byte_size,
                        self.max_retries + 1,
                        e
                    );
                    failed += 1;
                    parts.push(GENERATION_FAILED_PLACEHOLDER.to_string());
                }
            }
        }

        Conversion {
            markdown: parts.join(CHUNK_SEPARATOR),
            generated,
            failed,
        }
    }

    async fn generate_chunk(&self, chunk: &Chunk) -> Result<String, BackendError> {
        let user = user_prompt(&chunk.text);
        let mut attempt = 0;

        loop {
            let key = self.keys.next_key();
            match self.generator.generate(key, SYSTEM_INSTRUCTION, &user).await {
                Ok(text) => {
                    tracing::debug!("Chunk {} converted on attempt {}", chunk.index, attempt + 1);
                    return Ok(text);
                }
                Err(e) if attempt < self.max_retries => {
                    tracing::debug!(
                        "Chunk {} attempt {} failed, rotating credential: {}",
                        chunk.index,
                        attempt + 1,
                        e
                    );
                    attempt += 1;
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::chunk;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Generator that records the key of every call and fails on demand
    struct ScriptedGenerator {
        calls: Mutex<Vec<(String, String)>>,
        fail_when: Box<dyn Fn(&str, &str) -> bool + Send + Sync>,
    }

    impl ScriptedGenerator {
        fn new(fail_when: impl Fn(&str, &str) -> bool + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_when: Box::new(fail_when),
            })
        }

        fn keys_used(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            api_key: &str,
            system: &str,
            user: &str,
        ) -> Result<String, BackendError> {
            assert_eq!(system, SYSTEM_INSTRUCTION);
            self.calls
                .lock()
                .unwrap()
                .push((api_key.to_string(), user.to_string()));

            if (self.fail_when)(api_key, user) {
                return Err(BackendError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }

            Ok(format!("md({})", user.trim_start_matches("Input:\n")))
        }
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_chunks_are_joined_in_order() {
        let generator = ScriptedGenerator::new(|_, _| false);
        let pipeline =
            MarkdownPipeline::new(generator.clone(), keys(&["k1"]), 0, Duration::ZERO).unwrap();

        let chunks = chunk("one two three", 8).unwrap();
        let markdown = pipeline.to_markdown(&chunks).await;

        assert_eq!(markdown, "md(one two)\n\nmd(three)");
    }

    #[tokio::test]
    async fn test_rotation_advances_on_every_call() {
        let generator = ScriptedGenerator::new(|_, _| false);
        let pipeline = MarkdownPipeline::new(
            generator.clone(),
            keys(&["k1", "k2", "k3"]),
            0,
            Duration::ZERO,
        )
        .unwrap();

        let chunks = chunk("a b c d", 1).unwrap();
        pipeline.to_markdown(&chunks).await;

        assert_eq!(generator.keys_used(), keys(&["k1", "k2", "k3", "k1"]));
    }

    #[tokio::test]
    async fn test_single_chunk_failure_yields_placeholder() {
        let generator = ScriptedGenerator::new(|_, user| user.contains("bad"));
        let pipeline =
            MarkdownPipeline::new(generator.clone(), keys(&["k1", "k2"]), 0, Duration::ZERO)
                .unwrap();

        let chunks = chunk("good bad fine", 4).unwrap();
        let conversion = pipeline.convert(&chunks).await;

        assert_eq!(
            conversion.markdown,
            format!("md(good)\n\n{}\n\nmd(fine)", GENERATION_FAILED_PLACEHOLDER)
        );
        assert_eq!(conversion.generated, 2);
        assert_eq!(conversion.failed, 1);
    }

    #[tokio::test]
    async fn test_retry_uses_next_credential() {
        let generator = ScriptedGenerator::new(|key, _| key == "k1");
        let pipeline =
            MarkdownPipeline::new(generator.clone(), keys(&["k1", "k2"]), 1, Duration::ZERO)
                .unwrap();

        let chunks = chunk("hello", 100).unwrap();
        let markdown = pipeline.to_markdown(&chunks).await;

        assert_eq!(markdown, "md(hello)");
        assert_eq!(generator.keys_used(), keys(&["k1", "k2"]));
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let generator = ScriptedGenerator::new(|_, _| true);
        let pipeline =
            MarkdownPipeline::new(generator.clone(), keys(&["k1", "k2"]), 2, Duration::ZERO)
                .unwrap();

        let chunks = chunk("x", 100).unwrap();
        let markdown = pipeline.to_markdown(&chunks).await;

        assert_eq!(markdown, GENERATION_FAILED_PLACEHOLDER);
        assert_eq!(generator.keys_used(), keys(&["k1", "k2", "k1"]));
    }

    #[tokio::test]
    async fn test_pipelines_rotate_independently() {
        let generator = ScriptedGenerator::new(|_, _| false);
        let first =
            MarkdownPipeline::new(generator.clone(), keys(&["k1", "k2"]), 0, Duration::ZERO)
                .unwrap();
        let second =
            MarkdownPipeline::new(generator.clone(), keys(&["k1", "k2"]), 0, Duration::ZERO)
                .unwrap();

        let chunks = chunk("x", 100).unwrap();
        first.to_markdown(&chunks).await;
        second.to_markdown(&chunks).await;

        assert_eq!(generator.keys_used(), keys(&["k1", "k1"]));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let generator = ScriptedGenerator::new(|_, _| false);
        let result = MarkdownPipeline::new(generator, vec![], 0, Duration::ZERO);
        assert!(matches!(result, Err(BackendError::NoCredentials)));
    }
}
