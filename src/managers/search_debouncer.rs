//! Debounce for search-as-you-type.
//!
//! Each keystroke replaces the pending query and restarts the quiet period;
//! the query is released only after `delay` passes with no further input.

use std::time::{Duration, Instant};

/// Quiet period before a typed query is sent.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
struct PendingSearch {
    query: String,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<PendingSearch>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records a keystroke, cancelling whatever was pending.
    pub fn input(&mut self, query: &str, now: Instant) {
        self.pending = Some(PendingSearch {
            query: query.to_string(),
            deadline: now + self.delay,
        });
    }

    /// When the pending query becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Takes the pending query if its quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if due {
            self.pending.take().map(|p| p.query)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}
