//! Stand-in devices for optional controller collaborators.

use ranger_traits::{DiagnosticsSink, HwResult, Indicator};

/// Indicator that remembers its state but drives nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator {
    on: bool,
}

impl Indicator for NoopIndicator {
    fn set(&mut self, on: bool) -> HwResult<()> {
        self.on = on;
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {
    fn record(&mut self, _raw_mv: f32, _distance_cm: f32) {}
}
