//! Scrapemark: turns websites into LLM-ready Markdown
//!
//! This crate renders pages in a headless browser (falling back to a static
//! fetch when rendering fails), extracts their content, splits it into
//! byte-bounded chunks and sends each chunk through a text-generation backend
//! that rewrites it as clean Markdown.

pub mod config;
pub mod crawler;
pub mod markdown;
pub mod output;
pub mod render;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Scrapemark operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Chunking error: {0}")]
    Chunk(#[from] markdown::ChunkError),

    #[error("Backend error: {0}")]
    Backend(#[from] markdown::BackendError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Start URL {url} could not be reached: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::JobPhase,
        to: state::JobPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Scrapemark operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlJob, CrawlOutcome, Frontier};
pub use markdown::{chunk, Chunk, MarkdownDocument, MarkdownPipeline};
pub use render::{PageResult, RenderWorker};
pub use state::JobPhase;
pub use url::{is_noise, normalize, NormalizedUrl};
