//! Normalized command → PWM duty cycle mapping.

use tracing::trace;

/// Calibrated pulse span of a servo, as fractions of the PWM period.
///
/// A normalized command of 0.0 produces `min`, 1.0 produces `max`. Commands
/// outside [0, 1] are clamped here: this is the last point before the
/// horn hits its mechanical stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseCalibration {
    pub min: f32,
    pub max: f32,
}

impl PulseCalibration {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Duty cycle for a normalized command.
    pub fn duty_cycle(&self, command: f32) -> f32 {
        let clamped = if command.is_finite() {
            command.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if clamped != command {
            trace!(command, clamped, "servo command clamped to calibrated span");
        }
        self.min + clamped * (self.max - self.min)
    }
}

impl Default for PulseCalibration {
    /// Uncalibrated: the whole period.
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}
