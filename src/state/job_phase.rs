//! Phase definitions for a single crawl job
//!
//! A job moves `Seeding → Running → Draining → Done`. It may also go straight
//! from `Running` to `Done` when the frontier empties with no work in flight.

use crate::ScrapeError;
use std::fmt;

/// Represents the current phase of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    /// Start URL is being normalized and queued
    Seeding,

    /// Workers are pulling from the frontier
    Running,

    /// No new dispatch; in-flight renders are finishing
    Draining,

    /// All sessions closed, results handed back
    Done,
}

impl JobPhase {
    /// Returns true if new pages may be dispatched in this phase
    pub fn accepts_dispatch(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: JobPhase) -> bool {
        matches!(
            (self, next),
            (Self::Seeding, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Done)
                | (Self::Draining, Self::Done)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: JobPhase) -> Result<(), ScrapeError> {
        if !self.can_transition_to(next) {
            return Err(ScrapeError::InvalidTransition {
                from: *self,
                to: next,
            });
        }

        tracing::debug!("Crawl phase {} -> {}", self, next);
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
