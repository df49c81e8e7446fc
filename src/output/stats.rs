//! Statistics gathered during a crawl job
//!
//! This module provides the counters the coordinator updates as pages finish,
//! and the formatter used to display them at the end of a run.

use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Write;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the job started
    pub started_at: DateTime<Utc>,

    /// When the job finished (None while running)
    pub finished_at: Option<DateTime<Utc>>,

    /// Count of pages by outcome
    pub pages_by_outcome: HashMap<PageOutcome, u64>,

    /// Crawlable links offered to the frontier
    pub links_discovered: u64,

    /// Chunks converted to Markdown
    pub chunks_generated: u64,

    /// Chunks replaced by the failure placeholder
    pub chunks_failed: u64,
}

impl CrawlStatistics {
    /// Starts a new set of counters, stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_by_outcome: HashMap::new(),
            links_discovered: 0,
            chunks_generated: 0,
            chunks_failed: 0,
        }
    }

    pub fn record_page(&mut self, outcome: PageOutcome) {
        *self.pages_by_outcome.entry(outcome).or_insert(0) += 1;
    }

    pub fn record_links(&mut self, count: usize) {
        self.links_discovered += count as u64;
    }

    pub fn record_chunks(&mut self, generated: usize, failed: usize) {
        self.chunks_generated += generated as u64;
        self.chunks_failed += failed as u64;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of pages with the given outcome
    pub fn pages(&self, outcome: PageOutcome) -> u64 {
        self.pages_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Every page that was dispatched, whatever its outcome
    pub fn total_pages(&self) -> u64 {
        self.pages_by_outcome.values().sum()
    }

    /// Pages that produced a document
    pub fn successful_pages(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.is_success())
            .map(|(_, count)| count)
            .sum()
    }

    /// Percentage of dispatched pages that produced a document
    pub fn success_rate(&self) -> f64 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        (self.successful_pages() as f64 / total as f64) * 100.0
    }

    /// Elapsed seconds between start and finish (or now, while running)
    pub fn duration_seconds(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0) as f64 / 1000.0
    }
}

/// Formats statistics as a human-readable block
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Pages processed: {}", stats.total_pages());
    let _ = writeln!(out, "  Links discovered: {}", stats.links_discovered);
    let _ = writeln!(out, "  Duration: {:.1}s", stats.duration_seconds());
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages by Outcome:");
    for outcome in [
        PageOutcome::Rendered,
        PageOutcome::Fallback,
        PageOutcome::Failed,
        PageOutcome::Empty,
    ] {
        let count = stats.pages(outcome);
        if count > 0 {
            let _ = writeln!(out, "  {}: {}", outcome, count);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Chunks:");
    let _ = writeln!(out, "  Generated: {}", stats.chunks_generated);
    let _ = writeln!(out, "  Failed: {}", stats.chunks_failed);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages converted)",
        stats.success_rate(),
        stats.successful_pages(),
        stats.total_pages()
    );

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
