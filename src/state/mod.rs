//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `JobPhase`: the phase machine of one crawl job (seeding, running, draining, done)
//! - `PageOutcome`: how an individual page was processed (rendered, fallback, failed)

mod job_phase;
mod page_outcome;

// Re-export main types
pub use job_phase::JobPhase;
pub use page_outcome::PageOutcome;
