//! Per-iteration report returned by the controller.

use crate::compensation::SensorReading;
use crate::state::RobotState;

/// What one step of the control loop observed and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Latch state at the start of the step.
    pub engaged: bool,
    /// State machine state after the step.
    pub state: RobotState,
    pub reading: SensorReading,
    /// Command sent to the primary actuator, if any.
    pub command: Option<f32>,
    /// The one-time disengage reset ran during this step.
    pub reset_performed: bool,
}

impl StepReport {
    pub fn idle(state: RobotState, reading: SensorReading) -> Self {
        Self {
            engaged: false,
            state,
            reading,
            command: None,
            reset_performed: false,
        }
    }
}
