use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source for the control loop.
///
/// - now(): returns a monotonic Instant
/// - sleep(): suspends the caller (implementations may simulate)
/// - elapsed_since(): duration since an earlier Instant, zero if the epoch is in the future
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    fn elapsed_since(&self, epoch: Instant) -> Duration {
        self.now().saturating_duration_since(epoch)
    }

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let ms = self.elapsed_since(epoch).as_millis();
        ms.min(u128::from(u64::MAX)) as u64
    }
}

/// Wall clock backed by `std::time::Instant` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic clock whose time only moves when told to.
    ///
    /// now() = origin + offset
    /// sleep(d) advances the offset by d and records the request.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
                slept: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Advance the clock by `d` without recording a sleep.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Total time elapsed since construction.
        pub fn offset(&self) -> Duration {
            self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }

        /// Every non-zero sleep requested so far, oldest first.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.slept.lock().map(|g| g.clone()).unwrap_or_default()
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + self.offset()
        }

        fn sleep(&self, d: Duration) {
            if d.is_zero() {
                return;
            }
            if let Ok(mut s) = self.slept.lock() {
                s.push(d);
            }
            self.advance(d);
        }
    }
}
