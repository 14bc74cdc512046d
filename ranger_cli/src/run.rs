//! `run` command: assemble devices, drive the scheduler, report the outcome.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use ranger_core::{BuildError, LoopStats, RobotState, Scheduler, ToggleLatch, conversions};
use ranger_traits::MonotonicClock;

use crate::devices::assemble;
use crate::rt::{RtOptions, setup_rt_once};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub period_ms: Option<u64>,
    pub max_iterations: Option<u64>,
    pub engage: bool,
    pub stats: bool,
    pub rt: RtOptions,
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub stats: LoopStats,
    pub period: Duration,
    pub duration: Duration,
    pub final_state: RobotState,
}

pub fn run_loop(
    cfg: &ranger_config::Config,
    opts: RunOptions,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunSummary> {
    let period = match opts.period_ms {
        Some(period_ms) => conversions::period(&ranger_config::ControlCfg { period_ms })
            .map_err(|_| BuildError::InvalidConfig("--period-ms must be in 1..=1000"))?,
        None => conversions::period(&cfg.control)?,
    };

    let latch = Arc::new(ToggleLatch::new());
    let mut assembled = assemble(cfg, &latch)?;
    if opts.engage {
        latch.on_edge();
        tracing::info!("engaged at start");
    }

    setup_rt_once(opts.rt);

    let scheduler = Scheduler::new(MonotonicClock::new(), period)
        .with_shutdown(shutdown)
        .with_max_iterations(opts.max_iterations);
    let started = Instant::now();
    let stats = scheduler.run(&mut assembled.controller)?;

    let summary = RunSummary {
        stats,
        period,
        duration: started.elapsed(),
        final_state: assembled.controller.state(),
    };
    if opts.stats {
        print_stats(&summary);
    }
    Ok(summary)
}

/// Print latency/jitter stats to stderr.
fn print_stats(s: &RunSummary) {
    let us = |d: Option<Duration>| d.map_or(0, |d| d.as_micros());
    eprintln!("\n--- Ranger Stats ---");
    eprintln!("Iterations: {} (engaged {})", s.stats.iterations, s.stats.engaged_iterations);
    eprintln!("Period (us): {}", s.period.as_micros());
    eprintln!(
        "Latency min/avg/max/stdev (us): {} / {:.1} / {} / {:.1}",
        us(s.stats.min),
        s.stats.mean().as_secs_f64() * 1e6,
        us(s.stats.max),
        s.stats.stdev().as_secs_f64() * 1e6
    );
    eprintln!("Overruns (> period): {}", s.stats.overruns);
    eprintln!("--------------------\n");
}

pub fn summary_json(s: &RunSummary) -> serde_json::Value {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    let us = |d: Option<Duration>| d.map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));
    serde_json::json!({
        "timestamp": ts,
        "iterations": s.stats.iterations,
        "engaged_iterations": s.stats.engaged_iterations,
        "resets": s.stats.resets,
        "overruns": s.stats.overruns,
        "period_ms": u64::try_from(s.period.as_millis()).unwrap_or(u64::MAX),
        "duration_ms": u64::try_from(s.duration.as_millis()).unwrap_or(u64::MAX),
        "final_state": s.final_state.name(),
        "latency_us": {
            "min": us(s.stats.min),
            "mean": s.stats.mean().as_secs_f64() * 1e6,
            "max": us(s.stats.max),
            "stdev": s.stats.stdev().as_secs_f64() * 1e6,
        },
    })
}

pub fn summary_text(s: &RunSummary) -> String {
    format!(
        "stopped after {} iterations ({} engaged, {} resets, {} overruns); final state: {}",
        s.stats.iterations,
        s.stats.engaged_iterations,
        s.stats.resets,
        s.stats.overruns,
        s.final_state
    )
}
