#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core control logic for the IR range servo controller (hardware-agnostic).
//!
//! All device access goes through the `ranger_traits` traits, so the same
//! loop drives real GPIO/SPI/PWM devices and the simulated ones used in tests.
//!
//! ## Architecture
//!
//! - **Compensation**: raw millivolts → distance via `a / (mv + b)` (`compensation`)
//! - **Mapping**: distance → normalized servo command over the operating range (`mapping`)
//! - **Latch**: lock-free engage/disengage toggle shared with the edge handler (`latch`)
//! - **State machine**: INITIAL / EXECUTION / SLEEP / EMERGENCY (`state`)
//! - **Controller**: one iteration of sample, tick, heartbeat, diagnostics (`controller`)
//! - **Scheduler**: fixed-period loop with overrun accounting (`scheduler`)

pub mod builder;
pub mod compensation;
pub mod conversions;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod hw_error;
pub mod latch;
pub mod mapping;
pub mod mocks;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod timer;
pub mod util;

pub use builder::{BoxedController, ControllerBuilder};
pub use compensation::{INVALID_DISTANCE_CM, SensorCompensator, SensorReading};
pub use controller::ControllerCore;
pub use diagnostics::{FileSink, TracingSink};
pub use error::{BuildError, RangerError, Report, Result};
pub use latch::{LatchState, ToggleLatch};
pub use mapping::{OperatingRange, map};
pub use scheduler::{LoopStats, Scheduler};
pub use state::{ActuatorPair, RobotState, RobotStateMachine, Tick};
pub use status::StepReport;
pub use timer::PeriodTimer;
