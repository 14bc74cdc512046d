#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the IR range servo controller.
//!
//! - `Config` and its sections are deserialized from TOML.
//! - `Config::validate()` is the startup gate: anything it rejects must never
//!   reach the control loop (notably a degenerate operating range).
use serde::Deserialize;

/// GPIO / PWM wiring. BCM numbering for GPIO pins.
#[derive(Debug, Deserialize)]
pub struct Pins {
    /// Toggle button; its falling edge engages/disengages the loop.
    pub button_edge: u8,
    /// Mechanical sleep button, sampled by level every tick.
    pub button_level: u8,
    pub heartbeat_led: u8,
    pub engaged_led: Option<u8>,
    /// Hardware PWM channel (0 or 1) of the commanded servo.
    pub servo_primary: u8,
    /// Hardware PWM channel of the second servo (enabled/disabled with the first).
    pub servo_secondary: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    /// MCP3008 input channel (0..=7).
    pub adc_channel: u8,
    /// Millivolts at a normalized reading of 1.0.
    pub full_scale_mv: f32,
    /// Fitted numerator of `distance_cm = fit_a / (mv + fit_b)`.
    pub fit_a: f32,
    /// Fitted millivolt offset of the same curve.
    pub fit_b: f32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            adc_channel: 0,
            full_scale_mv: 3300.0,
            fit_a: 25_740.0,
            fit_b: -29.37,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RangeCfg {
    pub min_cm: f32,
    pub max_cm: f32,
}

impl Default for RangeCfg {
    fn default() -> Self {
        Self {
            min_cm: 10.0,
            max_cm: 35.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Nominal loop period in milliseconds.
    pub period_ms: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self { period_ms: 10 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ButtonCfg {
    /// Treat a low level as pressed (pull-up wiring).
    pub active_low: bool,
    /// Edges closer together than this are treated as bounce.
    pub debounce_ms: u64,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_ms: 50,
        }
    }
}

/// Pulse span of one servo, as fractions of the PWM period.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ServoCfg {
    pub pulse_min: f32,
    pub pulse_max: f32,
    #[serde(default = "default_servo_hz")]
    pub frequency_hz: f64,
}

fn default_servo_hz() -> f64 {
    50.0
}

impl ServoCfg {
    fn primary_default() -> Self {
        Self {
            pulse_min: 0.0150,
            pulse_max: 0.1150,
            frequency_hz: default_servo_hz(),
        }
    }

    fn secondary_default() -> Self {
        Self {
            pulse_min: 0.0325,
            pulse_max: 0.1250,
            frequency_hz: default_servo_hz(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Servos {
    #[serde(default = "ServoCfg::primary_default")]
    pub primary: ServoCfg,
    #[serde(default = "ServoCfg::secondary_default")]
    pub secondary: ServoCfg,
}

impl Default for Servos {
    fn default() -> Self {
        Self {
            primary: ServoCfg::primary_default(),
            secondary: ServoCfg::secondary_default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DiagnosticsCfg {
    /// Append per-iteration readings to this file instead of the tracing sink.
    pub file: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub sensor: SensorCfg,
    #[serde(default)]
    pub range: RangeCfg,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub button: ButtonCfg,
    #[serde(default)]
    pub servo: Servos,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub diagnostics: DiagnosticsCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl ServoCfg {
    fn validate(&self, name: &str) -> eyre::Result<()> {
        let in_unit = |v: f32| v.is_finite() && v > 0.0 && v < 1.0;
        if !in_unit(self.pulse_min) || !in_unit(self.pulse_max) {
            eyre::bail!("servo.{name} pulse_min/pulse_max must be in (0.0, 1.0)");
        }
        if self.pulse_min >= self.pulse_max {
            eyre::bail!("servo.{name}.pulse_min must be < pulse_max");
        }
        if !(self.frequency_hz.is_finite() && self.frequency_hz > 0.0) {
            eyre::bail!("servo.{name}.frequency_hz must be > 0");
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        if self.pins.button_edge == self.pins.button_level {
            eyre::bail!("pins.button_edge and pins.button_level must differ");
        }
        if self.pins.servo_primary > 1 || self.pins.servo_secondary > 1 {
            eyre::bail!("pins.servo_* must name PWM channel 0 or 1");
        }
        if self.pins.servo_primary == self.pins.servo_secondary {
            eyre::bail!("pins.servo_primary and pins.servo_secondary must differ");
        }

        // Sensor
        if self.sensor.adc_channel > 7 {
            eyre::bail!("sensor.adc_channel must be in 0..=7");
        }
        if !(self.sensor.full_scale_mv.is_finite() && self.sensor.full_scale_mv > 0.0) {
            eyre::bail!("sensor.full_scale_mv must be > 0");
        }
        if !self.sensor.fit_a.is_finite() || self.sensor.fit_a == 0.0 {
            eyre::bail!("sensor.fit_a must be finite and non-zero");
        }
        if !self.sensor.fit_b.is_finite() {
            eyre::bail!("sensor.fit_b must be finite");
        }

        // Range: the mapper divides by (max - min)
        if !self.range.min_cm.is_finite() || !self.range.max_cm.is_finite() {
            eyre::bail!("range.min_cm and range.max_cm must be finite");
        }
        if self.range.min_cm >= self.range.max_cm {
            eyre::bail!(
                "range.min_cm ({}) must be < range.max_cm ({})",
                self.range.min_cm,
                self.range.max_cm
            );
        }

        // Control
        if self.control.period_ms == 0 {
            eyre::bail!("control.period_ms must be >= 1");
        }
        if self.control.period_ms > 1000 {
            eyre::bail!("control.period_ms is unreasonably large (>1s)");
        }

        // Button
        if self.button.debounce_ms > 1000 {
            eyre::bail!("button.debounce_ms is unreasonably large (>1s)");
        }

        // Servos
        self.servo.primary.validate("primary")?;
        self.servo.secondary.validate("secondary")?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !ROTATIONS.contains(&rot.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        Ok(())
    }
}
