//! Device backends for the range controller.
//!
//! Simulated devices are always available and share their state through
//! cloneable handles so a test (or the CLI's sim mode) can steer inputs and
//! observe outputs while the controller owns the device. Raspberry Pi drivers
//! (`rppal`) sit behind the `hardware` feature.

pub mod debounce;
pub mod error;
pub mod servo;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod adc;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod pwm;

pub use debounce::EdgeDebouncer;
pub use servo::PulseCalibration;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use adc::HardwareSensor;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use gpio::{Gpio, HardwareButton, HardwareLed, watch_falling_edge};
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use pwm::HardwareServo;

use ranger_traits::{Actuator, AnalogSensor, HwResult, Indicator, LevelButton};
use std::cell::Cell;
use std::rc::Rc;
use tracing::trace;

use crate::error::HwError;

/// Simulated analog input holding a normalized value.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    value: Rc<Cell<f32>>,
}

impl SimulatedSensor {
    pub fn new(normalized: f32) -> Self {
        Self {
            value: Rc::new(Cell::new(normalized)),
        }
    }

    /// Sensor that reads back `mv` on an ADC with the given full scale.
    pub fn from_millivolts(mv: f32, full_scale_mv: f32) -> Self {
        Self::new(mv / full_scale_mv)
    }

    pub fn set(&self, normalized: f32) {
        self.value.set(normalized);
    }

    pub fn set_millivolts(&self, mv: f32, full_scale_mv: f32) {
        self.value.set(mv / full_scale_mv);
    }
}

impl AnalogSensor for SimulatedSensor {
    fn read(&mut self) -> HwResult<f32> {
        let v = self.value.get();
        trace!(normalized = v, "sim sensor read");
        Ok(v)
    }
}

/// Simulated level button.
#[derive(Debug, Clone, Default)]
pub struct SimulatedButton {
    pressed: Rc<Cell<bool>>,
}

impl SimulatedButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }
}

impl LevelButton for SimulatedButton {
    fn is_pressed(&mut self) -> HwResult<bool> {
        Ok(self.pressed.get())
    }
}

/// Observable state of a simulated servo.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ServoState {
    pub enabled: bool,
    pub last_command: Option<f32>,
    pub last_duty: Option<f32>,
    pub commands: u32,
    pub enable_calls: u32,
}

/// Simulated servo; clones share state, so keep one as a probe.
#[derive(Debug, Clone, Default)]
pub struct SimulatedServo {
    state: Rc<Cell<ServoState>>,
    calibration: PulseCalibration,
}

impl SimulatedServo {
    pub fn new(calibration: PulseCalibration) -> Self {
        Self {
            state: Rc::new(Cell::new(ServoState::default())),
            calibration,
        }
    }

    pub fn state(&self) -> ServoState {
        self.state.get()
    }

    fn update(&self, f: impl FnOnce(&mut ServoState)) {
        let mut s = self.state.get();
        f(&mut s);
        self.state.set(s);
    }
}

impl Actuator for SimulatedServo {
    fn enable(&mut self) -> HwResult<()> {
        self.update(|s| {
            s.enabled = true;
            s.enable_calls += 1;
        });
        Ok(())
    }

    fn disable(&mut self) -> HwResult<()> {
        self.update(|s| s.enabled = false);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.state.get().enabled
    }

    fn set_normalized(&mut self, command: f32) -> HwResult<()> {
        if !self.is_enabled() {
            return Err(Box::new(HwError::NotEnabled));
        }
        let duty = self.calibration.duty_cycle(command);
        self.update(|s| {
            s.last_command = Some(command);
            s.last_duty = Some(duty);
            s.commands += 1;
        });
        trace!(command, duty, "sim servo command");
        Ok(())
    }
}

/// Simulated LED; clones share state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLed {
    on: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl SimulatedLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl Indicator for SimulatedLed {
    fn set(&mut self, on: bool) -> HwResult<()> {
        self.on.set(on);
        self.writes.set(self.writes.get().saturating_add(1));
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on.get()
    }
}
