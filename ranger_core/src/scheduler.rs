//! Fixed-period control loop.
//!
//! Each iteration resets the period timer, runs one controller step and then
//! sleeps for whatever is left of the period. Overruns skip the sleep and are
//! counted; they never end the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ranger_traits::{Actuator, AnalogSensor, Clock, LevelButton};

use crate::controller::ControllerCore;
use crate::error::Result;
use crate::timer::PeriodTimer;
use crate::util::slack;

/// Running iteration statistics. Constant memory regardless of run length.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopStats {
    pub iterations: u64,
    pub engaged_iterations: u64,
    pub resets: u64,
    pub overruns: u64,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
    mean_us: f64,
    m2_us: f64,
}

impl LoopStats {
    /// Fold one iteration latency in (Welford's online update).
    pub fn record(&mut self, elapsed: Duration, period: Duration) {
        self.iterations += 1;
        if elapsed > period {
            self.overruns += 1;
        }
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));

        let x = elapsed.as_secs_f64() * 1e6;
        #[allow(clippy::cast_precision_loss)]
        let n = self.iterations as f64;
        let delta = x - self.mean_us;
        self.mean_us += delta / n;
        self.m2_us += delta * (x - self.mean_us);
    }

    pub fn mean(&self) -> Duration {
        Duration::from_secs_f64(self.mean_us.max(0.0) / 1e6)
    }

    /// Sample standard deviation; zero with fewer than two iterations.
    pub fn stdev(&self) -> Duration {
        if self.iterations < 2 {
            return Duration::ZERO;
        }
        #[allow(clippy::cast_precision_loss)]
        let var = self.m2_us / (self.iterations - 1) as f64;
        Duration::from_secs_f64(var.max(0.0).sqrt() / 1e6)
    }
}

#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    clock: C,
    period: Duration,
    shutdown: Arc<AtomicBool>,
    max_iterations: Option<u64>,
}

impl<C: Clock + Clone> Scheduler<C> {
    pub fn new(clock: C, period: Duration) -> Self {
        Self {
            clock,
            period,
            shutdown: Arc::new(AtomicBool::new(false)),
            max_iterations: None,
        }
    }

    /// Use an externally owned stop flag (e.g. set from a ctrl-c handler).
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    pub fn with_max_iterations(mut self, n: Option<u64>) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until the stop flag is set, the iteration cap is hit, or a step fails.
    ///
    /// Actuators are disabled on every exit path.
    pub fn run<S, B, A>(&self, core: &mut ControllerCore<S, B, A>) -> Result<LoopStats>
    where
        S: AnalogSensor,
        B: LevelButton,
        A: Actuator,
    {
        let mut stats = LoopStats::default();
        let mut timer = PeriodTimer::start(self.clock.clone());
        tracing::info!(period_ms = self.period.as_millis(), "control loop started");

        loop {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::info!("shutdown requested");
                break;
            }
            if self.max_iterations.is_some_and(|cap| stats.iterations >= cap) {
                tracing::debug!(iterations = stats.iterations, "iteration cap reached");
                break;
            }

            timer.reset();
            let report = match core.step() {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!(error = %e, "control step failed; stopping loop");
                    core.shutdown();
                    return Err(e);
                }
            };
            if report.engaged {
                stats.engaged_iterations += 1;
            }
            if report.reset_performed {
                stats.resets += 1;
            }

            let elapsed = timer.elapsed();
            stats.record(elapsed, self.period);
            let remaining = slack(self.period, elapsed);
            if elapsed > self.period {
                tracing::warn!(
                    elapsed_us = elapsed.as_micros(),
                    period_ms = self.period.as_millis(),
                    "loop overrun"
                );
            }
            self.clock.sleep(remaining);
        }

        core.shutdown();
        tracing::info!(
            iterations = stats.iterations,
            overruns = stats.overruns,
            "control loop stopped"
        );
        Ok(stats)
    }
}
