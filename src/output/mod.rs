//! Output module for crawl results
//!
//! This module handles:
//! - Writing converted Markdown documents to disk
//! - Recording and displaying crawl statistics

mod markdown;
pub mod stats;

pub use markdown::{document_file_stem, format_document, write_documents};
pub use stats::{format_statistics, print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors that can occur during output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
