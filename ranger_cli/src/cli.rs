//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "ranger", version, about = "IR range servo controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/ranger.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and print a JSON summary
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Memory locking mode for real-time operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RtLock {
    /// Do not lock memory
    None,
    /// Lock currently resident pages
    Current,
    /// Lock current and future pages
    All,
}

impl RtLock {
    #[inline]
    pub fn os_default() -> Self {
        if cfg!(target_os = "linux") {
            RtLock::Current
        } else {
            RtLock::None
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop until ctrl-c or the iteration cap
    Run {
        /// Override control.period_ms
        #[arg(long, value_name = "MS")]
        period_ms: Option<u64>,
        /// Stop after this many iterations
        #[arg(long, value_name = "N")]
        max_iterations: Option<u64>,
        /// Start engaged, as if the toggle button had been pressed once
        #[arg(long, action = ArgAction::SetTrue)]
        engage: bool,
        /// Print loop latency stats on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
        /// Enable real-time mode (SCHED_FIFO, affinity, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux.\n\nAttempts SCHED_FIFO priority, pins the process to one CPU and locks memory with mlockall. Needs CAP_SYS_NICE / CAP_IPC_LOCK (or root). Failures are logged and the loop runs without them."
        )]
        rt: bool,
        /// SCHED_FIFO priority for --rt (clamped to the system range)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
        /// Memory locking mode for --rt: none, current, or all
        #[arg(long, value_enum, value_name = "MODE")]
        rt_lock: Option<RtLock>,
        /// CPU index to pin to for --rt (default 0)
        #[arg(long, value_name = "CPU")]
        rt_cpu: Option<usize>,
    },
    /// Validate config and construct devices, then exit
    SelfCheck,
}
