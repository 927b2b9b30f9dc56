//! Trailing-edge debouncing of input values.

use std::time::Duration;

use tokio::time::Instant;

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;

/// Holds back the latest value until no newer value has arrived for a full
/// window.
///
/// The debouncer owns no timer. Callers pass the current instant in and poll
/// it once [`Debouncer::deadline`] has passed, which keeps it usable from any
/// event loop and deterministic under test.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pending>,
}

#[derive(Debug, Clone)]
struct Pending {
    value: String,
    deadline: Instant,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces the pending value and restarts the window at `now`.
    pub fn push(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(Pending {
            value: value.into(),
            deadline: now + self.window,
        });
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Instant at which the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if due {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }
}
