//! One control-loop iteration: sample, compensate, tick, report.

use std::sync::Arc;

use eyre::WrapErr;
use ranger_traits::{Actuator, AnalogSensor, DiagnosticsSink, Indicator, LevelButton};

use crate::compensation::{SensorCompensator, SensorReading};
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::latch::ToggleLatch;
use crate::state::{ActuatorPair, RobotState, RobotStateMachine};
use crate::status::StepReport;

/// Controller state owned by the control thread.
///
/// The only shared piece is the latch, which the edge handler toggles.
pub struct ControllerCore<S, B, A> {
    pub(crate) sensor: S,
    pub(crate) button: B,
    pub(crate) actuators: ActuatorPair<A>,
    pub(crate) machine: RobotStateMachine,
    pub(crate) latch: Arc<ToggleLatch>,
    pub(crate) compensator: SensorCompensator,
    pub(crate) heartbeat: Box<dyn Indicator>,
    pub(crate) engaged_led: Box<dyn Indicator>,
    pub(crate) diagnostics: Box<dyn DiagnosticsSink>,
    pub(crate) reading: SensorReading,
    pub(crate) last_command: Option<f32>,
}

impl<S, B, A> core::fmt::Debug for ControllerCore<S, B, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerCore")
            .field("state", &self.machine.state())
            .field("latch", &self.latch.snapshot())
            .field("reading", &self.reading)
            .field("last_command", &self.last_command)
            .finish_non_exhaustive()
    }
}

impl<S, B, A> ControllerCore<S, B, A>
where
    S: AnalogSensor,
    B: LevelButton,
    A: Actuator,
{
    /// Handle for the edge handler.
    pub fn latch(&self) -> Arc<ToggleLatch> {
        Arc::clone(&self.latch)
    }

    pub fn state(&self) -> RobotState {
        self.machine.state()
    }

    pub fn reading(&self) -> SensorReading {
        self.reading
    }

    pub fn last_command(&self) -> Option<f32> {
        self.last_command
    }

    pub fn actuators(&self) -> &ActuatorPair<A> {
        &self.actuators
    }

    pub fn compensator(&self) -> &SensorCompensator {
        &self.compensator
    }

    /// One iteration of the control loop, without the period sleep.
    pub fn step(&mut self) -> Result<StepReport> {
        let engaged = self.latch.is_engaged();
        let mut report = StepReport::idle(self.machine.state(), self.reading);
        report.engaged = engaged;

        if engaged {
            set_indicator(&mut *self.engaged_led, Some(true), "engaged");
            self.reading = self.sample()?;
            let tick = self.machine.tick(
                self.reading.distance_cm,
                &mut self.button,
                &mut self.actuators,
                &self.latch,
            )?;
            if tick.command.is_some() {
                self.last_command = tick.command;
            }
            report.state = tick.to;
            report.reading = self.reading;
            report.command = tick.command;
        } else if self.latch.take_reset() {
            self.one_time_reset()?;
            report.state = self.machine.state();
            report.reading = self.reading;
            report.reset_performed = true;
        }

        set_indicator(&mut *self.heartbeat, None, "heartbeat");
        self.diagnostics
            .record(self.reading.raw_mv, self.reading.distance_cm);
        Ok(report)
    }

    /// Disable both actuators; errors are logged, not returned.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.actuators.disable_all() {
            tracing::warn!(error = %e, "actuator disable failed during shutdown");
        }
        set_indicator(&mut *self.engaged_led, Some(false), "engaged");
    }

    fn sample(&mut self) -> Result<SensorReading> {
        let normalized = self
            .sensor
            .read()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading analog sensor")?;
        let reading = self.compensator.reading(normalized);
        if reading.is_valid() {
            tracing::trace!(raw_mv = reading.raw_mv, distance_cm = reading.distance_cm, "sample");
        } else {
            tracing::warn!(raw_mv = reading.raw_mv, "reading at curve singularity; forwarding sentinel");
        }
        Ok(reading)
    }

    fn one_time_reset(&mut self) -> Result<()> {
        self.actuators.disable_all()?;
        self.reading = SensorReading::default();
        self.last_command = None;
        self.machine.reset();
        set_indicator(&mut *self.engaged_led, Some(false), "engaged");
        tracing::info!("disengaged: actuators disabled, state reset");
        Ok(())
    }
}

/// `None` toggles.
fn set_indicator(ind: &mut dyn Indicator, on: Option<bool>, name: &'static str) {
    let res = match on {
        Some(v) => ind.set(v),
        None => ind.toggle(),
    };
    if let Err(e) = res {
        tracing::warn!(indicator = name, error = %e, "indicator write failed");
    }
}
