//! Period arithmetic for the control loop.

use std::time::Duration;

/// Remaining time in the period after `elapsed` of work.
/// - Zero when the iteration overran (no sleep, no negative durations).
#[inline]
pub fn slack(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}
