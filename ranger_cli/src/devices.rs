//! Device assembly: simulation backend by default, GPIO/SPI/PWM with `--features hardware`.

use std::sync::Arc;
use std::time::Duration;

use ranger_core::{BoxedController, ControllerBuilder, FileSink, RangerError, ToggleLatch};
use ranger_traits::{Actuator, AnalogSensor, DiagnosticsSink, Indicator, LevelButton};

/// Default simulated sensor voltage; about 26.5 cm with the reference fit.
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub const DEFAULT_SIM_MV: f32 = 1000.0;
/// Simulated sensor voltage in millivolts.
pub const SIM_MV_ENV: &str = "RANGER_SIM_MV";

/// Everything the loop needs, plus handles that must outlive it.
pub struct Assembled {
    pub controller: BoxedController,
    /// Edge watcher registration; dropping it disarms the interrupt.
    _edge_guard: Option<Box<dyn std::any::Any>>,
}

struct Devices {
    sensor: Box<dyn AnalogSensor>,
    button: Box<dyn LevelButton>,
    primary: Box<dyn Actuator>,
    secondary: Box<dyn Actuator>,
    heartbeat: Box<dyn Indicator>,
    engaged_led: Option<Box<dyn Indicator>>,
    edge_guard: Option<Box<dyn std::any::Any>>,
}

fn hw_fault(what: &str, e: impl std::fmt::Display) -> eyre::Report {
    eyre::Report::new(RangerError::HardwareFault(format!("{what}: {e}")))
}

/// Build the controller for `cfg`, wiring the toggle button to `latch`.
pub fn assemble(cfg: &ranger_config::Config, latch: &Arc<ToggleLatch>) -> eyre::Result<Assembled> {
    let devices = open_devices(cfg, latch)?;

    let diagnostics: Option<Box<dyn DiagnosticsSink>> = match cfg.diagnostics.file.as_deref() {
        Some(path) => Some(Box::new(
            FileSink::open(path).map_err(|e| hw_fault("opening diagnostics file", e))?,
        )),
        None => None,
    };

    type Boxed = ControllerBuilder<Box<dyn AnalogSensor>, Box<dyn LevelButton>, Box<dyn Actuator>>;
    let mut builder = Boxed::new()
        .with_config(cfg)?
        .with_sensor(devices.sensor)
        .with_button(devices.button)
        .with_actuators(devices.primary, devices.secondary)
        .with_heartbeat(devices.heartbeat)
        .with_latch(Arc::clone(latch));
    if let Some(led) = devices.engaged_led {
        builder = builder.with_engaged_led(led);
    }
    if let Some(sink) = diagnostics {
        builder = builder.with_diagnostics(sink);
    }

    Ok(Assembled {
        controller: builder.build()?,
        _edge_guard: devices.edge_guard,
    })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn open_devices(cfg: &ranger_config::Config, latch: &Arc<ToggleLatch>) -> eyre::Result<Devices> {
    use ranger_hardware::{
        PulseCalibration, SimulatedButton, SimulatedLed, SimulatedSensor, SimulatedServo,
    };

    let mv = sim_millivolts()?;
    tracing::info!(mv, "simulation backend");
    let servo = |s: &ranger_config::ServoCfg| {
        Box::new(SimulatedServo::new(PulseCalibration::new(s.pulse_min, s.pulse_max)))
            as Box<dyn Actuator>
    };
    spawn_stdin_toggle(
        Arc::clone(latch),
        Duration::from_millis(cfg.button.debounce_ms),
    );

    Ok(Devices {
        sensor: Box::new(SimulatedSensor::from_millivolts(mv, cfg.sensor.full_scale_mv)),
        button: Box::new(SimulatedButton::new()),
        primary: servo(&cfg.servo.primary),
        secondary: servo(&cfg.servo.secondary),
        heartbeat: Box::new(SimulatedLed::new()),
        engaged_led: Some(Box::new(SimulatedLed::new())),
        edge_guard: None,
    })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn sim_millivolts() -> eyre::Result<f32> {
    match std::env::var(SIM_MV_ENV) {
        Ok(s) => {
            let mv: f32 = s
                .trim()
                .parse()
                .map_err(|e| eyre::eyre!("{SIM_MV_ENV}='{s}' is not a number: {e}"))?;
            if !mv.is_finite() || mv < 0.0 {
                eyre::bail!("{SIM_MV_ENV} must be a finite, non-negative voltage");
            }
            Ok(mv)
        }
        Err(_) => Ok(DEFAULT_SIM_MV),
    }
}

/// In simulation, each Enter on an interactive stdin is one toggle-button press.
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn spawn_stdin_toggle(latch: Arc<ToggleLatch>, debounce: Duration) {
    use std::io::{BufRead, IsTerminal};

    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return;
    }
    let spawned = std::thread::Builder::new()
        .name("stdin-toggle".into())
        .spawn(move || {
            let mut debouncer = ranger_hardware::EdgeDebouncer::new(debounce);
            for line in stdin.lock().lines() {
                if line.is_err() {
                    break;
                }
                if debouncer.accept(std::time::Instant::now()) {
                    let s = latch.on_edge();
                    tracing::info!(engaged = s.engaged, "toggle");
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "stdin toggle unavailable");
    } else {
        tracing::info!("press Enter to engage/disengage");
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_devices(cfg: &ranger_config::Config, latch: &Arc<ToggleLatch>) -> eyre::Result<Devices> {
    use ranger_hardware::{
        Gpio, HardwareButton, HardwareLed, HardwareSensor, HardwareServo, PulseCalibration,
        watch_falling_edge,
    };

    if std::env::var_os(SIM_MV_ENV).is_some() {
        tracing::warn!("{SIM_MV_ENV} is ignored by the hardware backend");
    }
    let gpio = Gpio::new().map_err(|e| hw_fault("opening GPIO", e))?;
    let pins = &cfg.pins;

    let sensor = HardwareSensor::new(cfg.sensor.adc_channel)
        .map_err(|e| hw_fault("opening ADC", e))?;
    let button = HardwareButton::new(&gpio, pins.button_level, cfg.button.active_low)
        .map_err(|e| hw_fault("opening level button", e))?;
    let heartbeat =
        HardwareLed::new(&gpio, pins.heartbeat_led).map_err(|e| hw_fault("opening heartbeat LED", e))?;
    let engaged_led = match pins.engaged_led {
        Some(bcm) => Some(Box::new(
            HardwareLed::new(&gpio, bcm).map_err(|e| hw_fault("opening engaged LED", e))?,
        ) as Box<dyn Indicator>),
        None => None,
    };
    let servo = |channel: u8, s: &ranger_config::ServoCfg| {
        HardwareServo::new(
            channel,
            s.frequency_hz,
            PulseCalibration::new(s.pulse_min, s.pulse_max),
        )
        .map(|s| Box::new(s) as Box<dyn Actuator>)
        .map_err(|e| hw_fault("opening PWM channel", e))
    };
    let primary = servo(pins.servo_primary, &cfg.servo.primary)?;
    let secondary = servo(pins.servo_secondary, &cfg.servo.secondary)?;

    let edge_latch = Arc::clone(latch);
    let edge_pin = watch_falling_edge(
        &gpio,
        pins.button_edge,
        Duration::from_millis(cfg.button.debounce_ms),
        move || {
            edge_latch.on_edge();
        },
    )
    .map_err(|e| hw_fault("arming toggle button interrupt", e))?;

    Ok(Devices {
        sensor: Box::new(sensor),
        button: Box::new(button),
        primary,
        secondary,
        heartbeat: Box::new(heartbeat),
        engaged_led,
        edge_guard: Some(Box::new(edge_pin)),
    })
}
