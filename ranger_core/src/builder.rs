//! Builder for `ControllerCore`.
//!
//! Devices are required; indicators, diagnostics, compensation and the latch
//! fall back to defaults. Missing pieces surface as typed `BuildError`s.

use std::sync::Arc;

use ranger_traits::{Actuator, AnalogSensor, DiagnosticsSink, Indicator, LevelButton};

use crate::compensation::{SensorCompensator, SensorReading};
use crate::controller::ControllerCore;
use crate::diagnostics::TracingSink;
use crate::error::{BuildError, Result};
use crate::latch::ToggleLatch;
use crate::mapping::OperatingRange;
use crate::mocks::NoopIndicator;
use crate::state::{ActuatorPair, RobotStateMachine};

/// Controller over boxed devices, for callers that pick hardware at runtime.
pub type BoxedController =
    ControllerCore<Box<dyn AnalogSensor>, Box<dyn LevelButton>, Box<dyn Actuator>>;

pub struct ControllerBuilder<S, B, A> {
    sensor: Option<S>,
    button: Option<B>,
    actuators: Option<ActuatorPair<A>>,
    range: Option<OperatingRange>,
    compensator: Option<SensorCompensator>,
    latch: Option<Arc<ToggleLatch>>,
    heartbeat: Option<Box<dyn Indicator>>,
    engaged_led: Option<Box<dyn Indicator>>,
    diagnostics: Option<Box<dyn DiagnosticsSink>>,
}

impl<S, B, A> Default for ControllerBuilder<S, B, A> {
    fn default() -> Self {
        Self {
            sensor: None,
            button: None,
            actuators: None,
            range: None,
            compensator: None,
            latch: None,
            heartbeat: None,
            engaged_led: None,
            diagnostics: None,
        }
    }
}

impl<S, B, A> ControllerBuilder<S, B, A>
where
    S: AnalogSensor,
    B: LevelButton,
    A: Actuator,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor(mut self, sensor: S) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn with_button(mut self, button: B) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_actuators(mut self, primary: A, secondary: A) -> Self {
        self.actuators = Some(ActuatorPair::new(primary, secondary));
        self
    }

    pub fn with_range(mut self, range: OperatingRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_compensator(mut self, compensator: SensorCompensator) -> Self {
        self.compensator = Some(compensator);
        self
    }

    /// Share an existing latch, e.g. one already wired to an edge handler.
    pub fn with_latch(mut self, latch: Arc<ToggleLatch>) -> Self {
        self.latch = Some(latch);
        self
    }

    pub fn with_heartbeat(mut self, led: Box<dyn Indicator>) -> Self {
        self.heartbeat = Some(led);
        self
    }

    pub fn with_engaged_led(mut self, led: Box<dyn Indicator>) -> Self {
        self.engaged_led = Some(led);
        self
    }

    pub fn with_diagnostics(mut self, sink: Box<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Range and compensation from a validated config file.
    pub fn with_config(mut self, cfg: &ranger_config::Config) -> std::result::Result<Self, BuildError> {
        self.range = Some(OperatingRange::try_from(&cfg.range)?);
        self.compensator = Some(SensorCompensator::try_from(&cfg.sensor)?);
        Ok(self)
    }

    pub fn build(self) -> Result<ControllerCore<S, B, A>> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let button = self
            .button
            .ok_or_else(|| eyre::Report::new(BuildError::MissingButton))?;
        let actuators = self
            .actuators
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuators))?;
        let range = self
            .range
            .ok_or_else(|| eyre::Report::new(BuildError::MissingRange))?;

        Ok(ControllerCore {
            sensor,
            button,
            actuators,
            machine: RobotStateMachine::new(range),
            latch: self.latch.unwrap_or_default(),
            compensator: self.compensator.unwrap_or_default(),
            heartbeat: self
                .heartbeat
                .unwrap_or_else(|| Box::new(NoopIndicator::default())),
            engaged_led: self
                .engaged_led
                .unwrap_or_else(|| Box::new(NoopIndicator::default())),
            diagnostics: self.diagnostics.unwrap_or_else(|| Box::new(TracingSink)),
            reading: SensorReading::default(),
            last_command: None,
        })
    }
}
