//! Time-window debouncing for edge-triggered inputs.

use std::time::{Duration, Instant};

/// Accepts an edge only if the previous accepted edge is at least `window` old.
///
/// Used inside interrupt callbacks, so `accept` never blocks or allocates.
#[derive(Debug, Clone)]
pub struct EdgeDebouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl EdgeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Returns true if the edge at `now` is a real press.
    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(prev) if now.saturating_duration_since(prev) < self.window => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}
