use crate::config::types::{BackendConfig, ChunkerConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use std::ops::RangeInclusive;
use url::Url;

/// Allowed hard timeout for one navigation, in seconds
const NAVIGATION_TIMEOUT_RANGE: RangeInclusive<u64> = 30..=60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_chunker_config(&config.chunker)?;
    validate_backend_config(&config.backend)?;
    validate_output_config(&config.output)?;

    if config.user_agent.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > 1000 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 1000, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if !NAVIGATION_TIMEOUT_RANGE.contains(&config.navigation_timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-secs must be between 30 and 60, got {}",
            config.navigation_timeout_secs
        )));
    }

    if config.scroll_step_px == 0 {
        return Err(ConfigError::Validation(
            "scroll-step-px must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates chunker configuration
fn validate_chunker_config(config: &ChunkerConfig) -> Result<(), ConfigError> {
    if config.max_bytes < 64 {
        return Err(ConfigError::Validation(format!(
            "max-bytes must be >= 64, got {}",
            config.max_bytes
        )));
    }

    Ok(())
}

/// Validates backend configuration
fn validate_backend_config(config: &BackendConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid backend endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Backend endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "backend model cannot be empty".to_string(),
        ));
    }

    if config.api_keys.is_empty() && config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "backend needs at least one of api-keys or api-key-env".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
