//! Crawler module for traversal and orchestration
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with its page budget
//! - Static HTTP fetching and HTML parsing for the render fallback
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{Coordinator, CrawlJob, CrawlOutcome, PageFailure};
pub use fetcher::{build_http_client, StaticFetcher};
pub use frontier::Frontier;
pub use parser::{parse_html, StaticPage};
