//! Period timer over an injectable `Clock`.

use std::time::{Duration, Instant};

use ranger_traits::Clock;

#[derive(Debug, Clone)]
pub struct PeriodTimer<C: Clock> {
    clock: C,
    epoch: Instant,
}

impl<C: Clock> PeriodTimer<C> {
    /// Start timing immediately.
    pub fn start(clock: C) -> Self {
        let epoch = clock.now();
        Self { clock, epoch }
    }

    /// Restart from now.
    pub fn reset(&mut self) {
        self.epoch = self.clock.now();
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed_since(self.epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranger_traits::clock::test_clock::TestClock;

    #[test]
    fn elapsed_tracks_clock_since_reset() {
        let clock = TestClock::new();
        let mut t = PeriodTimer::start(clock.clone());
        clock.advance(Duration::from_millis(4));
        assert_eq!(t.elapsed(), Duration::from_millis(4));
        t.reset();
        assert_eq!(t.elapsed(), Duration::ZERO);
        clock.advance(Duration::from_millis(1));
        assert_eq!(t.elapsed(), Duration::from_millis(1));
    }
}
