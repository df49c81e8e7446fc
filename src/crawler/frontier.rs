//! Crawl frontier with a page budget
//!
//! The frontier owns the FIFO queue of pages still to visit and the set of
//! pages already handed out. All state sits behind one mutex, so popping a URL
//! and marking it visited happen in a single critical section.

use crate::url::NormalizedUrl;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct FrontierState {
    /// URLs waiting to be dispatched, breadth-first
    queue: VecDeque<NormalizedUrl>,

    /// Mirror of `queue` for O(1) duplicate checks
    queued: HashSet<NormalizedUrl>,

    /// URLs already handed to a worker
    visited: HashSet<NormalizedUrl>,

    /// Dispatched URLs whose processing has not completed
    in_flight: usize,
}

/// Queue plus visited set, bounded by `max_pages`
///
/// # Invariants
///
/// - A URL is never queued twice and never queued once visited
/// - The visited set never grows beyond `max_pages`
/// - Concurrent [`Frontier::next`] calls never return the same URL
#[derive(Debug)]
pub struct Frontier {
    max_pages: usize,
    state: Mutex<FrontierState>,
}

impl Frontier {
    /// Creates an empty frontier with the given page budget
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            state: Mutex::new(FrontierState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a URL to the frontier
    ///
    /// No-op if the URL is already visited or queued, or if the visited set
    /// has reached the page budget.
    ///
    /// # Returns
    ///
    /// `true` if the URL was appended to the queue
    pub fn enqueue(&self, url: NormalizedUrl) -> bool {
        let mut state = self.lock();

        if state.visited.len() >= self.max_pages
            || state.visited.contains(&url)
            || state.queued.contains(&url)
        {
            return false;
        }

        state.queued.insert(url.clone());
        state.queue.push_back(url);
        true
    }

    /// Pops the oldest queued URL and marks it visited
    ///
    /// Returns `None` when the queue is empty or the page budget is spent.
    /// The returned URL counts as in flight until [`Frontier::complete`] is
    /// called for it.
    pub fn next(&self) -> Option<NormalizedUrl> {
        let mut state = self.lock();

        if state.visited.len() >= self.max_pages {
            return None;
        }

        let url = state.queue.pop_front()?;
        state.queued.remove(&url);
        state.visited.insert(url.clone());
        state.in_flight += 1;

        Some(url)
    }

    /// Marks one dispatched URL as fully processed
    ///
    /// Call only after the URL's discovered links have been offered back
    /// through [`Frontier::enqueue`].
    pub fn complete(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// True when nothing is in flight and nothing more can be dispatched
    pub fn is_exhausted(&self) -> bool {
        let state = self.lock();
        state.in_flight == 0 && (state.queue.is_empty() || state.visited.len() >= self.max_pages)
    }

    /// True once the visited set has reached the page budget
    pub fn budget_reached(&self) -> bool {
        self.lock().visited.len() >= self.max_pages
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.lock().in_flight
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }
}
