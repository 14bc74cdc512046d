//! Robot state machine: one handler per state, evaluated once per engaged tick.

use eyre::WrapErr;
use ranger_traits::{Actuator, LevelButton};

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::latch::ToggleLatch;
use crate::mapping::OperatingRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RobotState {
    /// Entry state: actuators are brought up here.
    #[default]
    Initial,
    /// Distance drives the primary actuator.
    Execution,
    /// Paused by the level button; no commands.
    Sleep,
    /// Over-range fail-safe; disengages the loop until an operator re-engages.
    Emergency,
}

impl RobotState {
    pub fn name(&self) -> &'static str {
        match self {
            RobotState::Initial => "initial",
            RobotState::Execution => "execution",
            RobotState::Sleep => "sleep",
            RobotState::Emergency => "emergency",
        }
    }
}

impl core::fmt::Display for RobotState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The commanded servo plus the companion servo that is only enabled/disabled.
#[derive(Debug)]
pub struct ActuatorPair<A> {
    pub primary: A,
    pub secondary: A,
}

impl<A: Actuator> ActuatorPair<A> {
    pub fn new(primary: A, secondary: A) -> Self {
        Self { primary, secondary }
    }

    /// Enable whichever actuator is not yet enabled.
    pub fn enable_all(&mut self) -> Result<()> {
        if !self.primary.is_enabled() {
            self.primary
                .enable()
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("enable primary actuator")?;
        }
        if !self.secondary.is_enabled() {
            self.secondary
                .enable()
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("enable secondary actuator")?;
        }
        Ok(())
    }

    pub fn disable_all(&mut self) -> Result<()> {
        self.primary
            .disable()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("disable primary actuator")?;
        self.secondary
            .disable()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("disable secondary actuator")?;
        Ok(())
    }

    pub fn command_primary(&mut self, command: f32) -> Result<()> {
        self.primary
            .set_normalized(command)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("command primary actuator")
    }

    pub fn all_enabled(&self) -> bool {
        self.primary.is_enabled() && self.secondary.is_enabled()
    }
}

/// Outcome of one state-machine tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub from: RobotState,
    pub to: RobotState,
    /// Command sent to the primary actuator this tick, if any.
    pub command: Option<f32>,
}

impl Tick {
    pub fn transitioned(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone)]
pub struct RobotStateMachine {
    state: RobotState,
    range: OperatingRange,
}

impl RobotStateMachine {
    pub fn new(range: OperatingRange) -> Self {
        Self {
            state: RobotState::Initial,
            range,
        }
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    /// Return to the entry state.
    pub fn reset(&mut self) {
        self.state = RobotState::Initial;
    }

    /// Run the current state's handler once and apply its transition.
    pub fn tick<A, B>(
        &mut self,
        distance_cm: f32,
        button: &mut B,
        actuators: &mut ActuatorPair<A>,
        latch: &ToggleLatch,
    ) -> Result<Tick>
    where
        A: Actuator,
        B: LevelButton,
    {
        let from = self.state;
        let (to, command) = match from {
            RobotState::Initial => (self.on_initial(actuators)?, None),
            RobotState::Execution => self.on_execution(distance_cm, button, actuators)?,
            RobotState::Sleep => (self.on_sleep(button)?, None),
            RobotState::Emergency => (self.on_emergency(latch), None),
        };
        self.state = to;
        let tick = Tick { from, to, command };
        if tick.transitioned() {
            match to {
                RobotState::Emergency => tracing::warn!(
                    distance_cm,
                    max_cm = self.range.max_cm(),
                    "distance beyond range; entering emergency"
                ),
                _ => tracing::info!(from = %from, to = %to, "state transition"),
            }
        }
        Ok(tick)
    }

    fn on_initial<A: Actuator>(&mut self, actuators: &mut ActuatorPair<A>) -> Result<RobotState> {
        actuators.enable_all()?;
        Ok(RobotState::Execution)
    }

    fn on_execution<A: Actuator, B: LevelButton>(
        &mut self,
        distance_cm: f32,
        button: &mut B,
        actuators: &mut ActuatorPair<A>,
    ) -> Result<(RobotState, Option<f32>)> {
        let command = self.range.map(distance_cm);
        actuators.command_primary(command)?;

        let next = if read_button(button)? {
            RobotState::Sleep
        } else if self.range.exceeds_max(distance_cm) {
            RobotState::Emergency
        } else {
            RobotState::Execution
        };
        Ok((next, Some(command)))
    }

    fn on_sleep<B: LevelButton>(&mut self, button: &mut B) -> Result<RobotState> {
        Ok(if read_button(button)? {
            RobotState::Execution
        } else {
            RobotState::Sleep
        })
    }

    fn on_emergency(&mut self, latch: &ToggleLatch) -> RobotState {
        latch.force_disengage();
        tracing::error!("emergency: control loop disengaged; re-engage to recover");
        RobotState::Emergency
    }
}

fn read_button<B: LevelButton>(button: &mut B) -> Result<bool> {
    button
        .is_pressed()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err("reading level button")
}
