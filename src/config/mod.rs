//! Configuration module for Scrapemark
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use scrapemark::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrapemark.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawler.max_pages);
//! ```

mod credentials;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackendConfig, ChunkerConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation so command-line overrides can be re-checked
pub use validation::validate;
