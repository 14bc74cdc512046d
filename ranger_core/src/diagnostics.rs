//! Diagnostic record sinks: one `(raw_mv, distance_cm)` line per iteration.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use ranger_traits::DiagnosticsSink;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Emits each record as a `debug` tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&mut self, raw_mv: f32, distance_cm: f32) {
        tracing::debug!(target: "ranger::diag", raw_mv, distance_cm);
    }
}

/// Appends `raw_mv,distance_cm` lines to a file from a background writer thread.
///
/// The loop only queues each line; if the queue is full the line is dropped.
/// Pending lines are flushed when the sink is dropped.
pub struct FileSink {
    out: NonBlocking,
    line: String,
    failed: bool,
    _guard: WorkerGuard,
}

impl core::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FileSink")
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let (out, guard) = tracing_appender::non_blocking(file);
        Ok(Self {
            out,
            line: String::with_capacity(32),
            failed: false,
            _guard: guard,
        })
    }
}

impl DiagnosticsSink for FileSink {
    fn record(&mut self, raw_mv: f32, distance_cm: f32) {
        self.line.clear();
        // Formatting into a String cannot fail.
        let _ = writeln!(self.line, "{raw_mv:.2},{distance_cm:.2}");
        if let Err(e) = self.out.write_all(self.line.as_bytes()) {
            if !self.failed {
                tracing::warn!(error = %e, "diagnostics write failed; further failures suppressed");
                self.failed = true;
            }
        }
    }
}
