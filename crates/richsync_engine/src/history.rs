//! Quiescence debounce for undo-level requests.

use std::time::{Duration, Instant};

/// Fires once after commits stop arriving for `window`.
///
/// Each [`schedule`](Self::schedule) resets the deadline instead of queueing,
/// so a burst of commits yields exactly one firing.
#[derive(Debug, Clone)]
pub struct UndoDebouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl UndoDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// (Re)starts the window at `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Returns true once when the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
