use serde::Deserialize;

/// Default desktop user agent presented by render sessions and static fetches
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

/// Main configuration structure for Scrapemark
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub chunker: ChunkerConfig,
    pub backend: BackendConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Page budget for a single crawl job
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Number of render sessions allowed to run in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Hard timeout for one navigation (seconds)
    #[serde(rename = "navigation-timeout-secs", default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Pixels scrolled per auto-scroll increment
    #[serde(rename = "scroll-step-px", default = "default_scroll_step")]
    pub scroll_step_px: u32,

    /// Pause between auto-scroll increments (milliseconds)
    #[serde(rename = "scroll-delay-ms", default = "default_scroll_delay")]
    pub scroll_delay_ms: u64,

    /// Upper bound on auto-scroll increments per page
    #[serde(rename = "max-scroll-steps", default = "default_max_scroll_steps")]
    pub max_scroll_steps: u32,

    /// Whether the browser runs without a window
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            navigation_timeout_secs: default_navigation_timeout(),
            scroll_step_px: default_scroll_step(),
            scroll_delay_ms: default_scroll_delay(),
            max_scroll_steps: default_max_scroll_steps(),
            headless: true,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkerConfig {
    /// UTF-8 byte budget for one chunk
    #[serde(rename = "max-bytes", default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

/// Text-generation backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the generative language API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name used for generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Literal API keys
    #[serde(rename = "api-keys", default)]
    pub api_keys: Vec<String>,

    /// Names of environment variables holding API keys
    #[serde(rename = "api-key-env", default)]
    pub api_key_env: Vec<String>,

    /// Extra attempts per chunk after the first failure
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause before a retry (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Timeout for one generation request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// User agent string sent by browsers and the static fetcher
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory where one Markdown file per page is written
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_max_pages() -> usize {
    10
}

fn default_concurrency() -> usize {
    2
}

fn default_navigation_timeout() -> u64 {
    30
}

fn default_scroll_step() -> u32 {
    100
}

fn default_scroll_delay() -> u64 {
    100
}

fn default_max_scroll_steps() -> u32 {
    200
}

fn default_true() -> bool {
    true
}

fn default_max_bytes() -> usize {
    9000
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_delay() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_directory() -> String {
    "./scrapemark-out".to_string()
}
