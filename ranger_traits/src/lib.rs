pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type crossing the hardware trait boundary.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Analog input returning a normalized reading in [0, 1] of the ADC full scale.
pub trait AnalogSensor {
    fn read(&mut self) -> HwResult<f32>;
}

/// Level-sampled push button (pull-up wired, so "not pressed" is the stable idle level).
pub trait LevelButton {
    fn is_pressed(&mut self) -> HwResult<bool>;
}

/// Servo-like actuator driven by a normalized command.
///
/// Mapping the command onto a physical pulse width is the implementation's business.
pub trait Actuator {
    fn enable(&mut self) -> HwResult<()>;
    fn disable(&mut self) -> HwResult<()>;
    fn is_enabled(&self) -> bool;
    fn set_normalized(&mut self, command: f32) -> HwResult<()>;
}

/// Single on/off indicator, typically an LED.
pub trait Indicator {
    fn set(&mut self, on: bool) -> HwResult<()>;
    fn is_on(&self) -> bool;

    fn toggle(&mut self) -> HwResult<()> {
        let next = !self.is_on();
        self.set(next)
    }
}

/// Receives one `(raw_mv, distance_cm)` record per loop iteration.
///
/// Implementations must not block; failures are theirs to swallow.
pub trait DiagnosticsSink {
    fn record(&mut self, raw_mv: f32, distance_cm: f32);
}

impl<T: AnalogSensor + ?Sized> AnalogSensor for Box<T> {
    fn read(&mut self) -> HwResult<f32> {
        (**self).read()
    }
}

impl<T: LevelButton + ?Sized> LevelButton for Box<T> {
    fn is_pressed(&mut self) -> HwResult<bool> {
        (**self).is_pressed()
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn enable(&mut self) -> HwResult<()> {
        (**self).enable()
    }
    fn disable(&mut self) -> HwResult<()> {
        (**self).disable()
    }
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
    fn set_normalized(&mut self, command: f32) -> HwResult<()> {
        (**self).set_normalized(command)
    }
}
