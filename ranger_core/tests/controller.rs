use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use ranger_core::{
    ControllerBuilder, ControllerCore, INVALID_DISTANCE_CM, OperatingRange, RangerError,
    RobotState, SensorCompensator,
};
use ranger_hardware::{
    PulseCalibration, SimulatedButton, SimulatedLed, SimulatedSensor, SimulatedServo,
};
use ranger_traits::{AnalogSensor, DiagnosticsSink, HwResult, Indicator};

const FULL_SCALE_MV: f32 = 3300.0;

#[derive(Clone, Default)]
struct RecordingSink(Rc<RefCell<Vec<(f32, f32)>>>);

impl DiagnosticsSink for RecordingSink {
    fn record(&mut self, raw_mv: f32, distance_cm: f32) {
        self.0.borrow_mut().push((raw_mv, distance_cm));
    }
}

struct Rig {
    core: ControllerCore<SimulatedSensor, SimulatedButton, SimulatedServo>,
    sensor: SimulatedSensor,
    button: SimulatedButton,
    primary: SimulatedServo,
    secondary: SimulatedServo,
    heartbeat: SimulatedLed,
    engaged_led: SimulatedLed,
    diag: RecordingSink,
}

fn rig(mv: f32) -> Rig {
    let sensor = SimulatedSensor::from_millivolts(mv, FULL_SCALE_MV);
    let button = SimulatedButton::new();
    let primary = SimulatedServo::new(PulseCalibration::default());
    let secondary = SimulatedServo::new(PulseCalibration::default());
    let heartbeat = SimulatedLed::new();
    let engaged_led = SimulatedLed::new();
    let diag = RecordingSink::default();
    let core = ControllerBuilder::new()
        .with_sensor(sensor.clone())
        .with_button(button.clone())
        .with_actuators(primary.clone(), secondary.clone())
        .with_range(OperatingRange::default())
        .with_compensator(SensorCompensator::default())
        .with_heartbeat(Box::new(heartbeat.clone()))
        .with_engaged_led(Box::new(engaged_led.clone()))
        .with_diagnostics(Box::new(diag.clone()))
        .build()
        .expect("build controller");
    Rig {
        core,
        sensor,
        button,
        primary,
        secondary,
        heartbeat,
        engaged_led,
        diag,
    }
}

#[test]
fn disengaged_controller_only_beats_heart() {
    let mut r = rig(1000.0);
    for _ in 0..4 {
        let rep = r.core.step().unwrap();
        assert!(!rep.engaged);
        assert!(!rep.reset_performed);
        assert_eq!(rep.command, None);
        assert_eq!(rep.state, RobotState::Initial);
    }
    assert_eq!(r.heartbeat.writes(), 4);
    assert!(!r.heartbeat.is_on());
    assert_eq!(r.primary.state().enable_calls, 0);
    assert_eq!(r.diag.0.borrow().len(), 4);
    assert!(r.diag.0.borrow().iter().all(|&(mv, d)| mv == 0.0 && d == 0.0));
}

#[test]
fn reading_500_mv_trips_emergency_then_disengages() {
    let mut r = rig(500.0);
    r.core.latch().on_edge();

    let rep = r.core.step().unwrap();
    assert_eq!(rep.state, RobotState::Execution);
    assert!(r.primary.state().enabled && r.secondary.state().enabled);
    assert!(r.engaged_led.is_on());

    let rep = r.core.step().unwrap();
    let expected_cm = 25_740.0 / (500.0 - 29.37);
    assert!((rep.reading.raw_mv - 500.0).abs() < 1e-2);
    assert!((rep.reading.distance_cm - expected_cm).abs() < 1e-2);
    let cmd = rep.command.expect("primary commanded");
    assert!((cmd - (expected_cm - 10.0) / 25.0).abs() < 1e-3);
    assert!(cmd > 1.0);
    assert_eq!(rep.state, RobotState::Emergency);
    // The entering tick only records the transition.
    assert!(r.core.latch().is_engaged());

    let rep = r.core.step().unwrap();
    assert!(rep.engaged);
    assert_eq!(rep.state, RobotState::Emergency);
    assert_eq!(rep.command, None);
    assert!(!r.core.latch().is_engaged());
}

#[test]
fn disengage_runs_one_time_reset_then_reengage_recovers() {
    let mut r = rig(500.0);
    let latch = r.core.latch();
    latch.on_edge();
    r.core.step().unwrap();
    r.core.step().unwrap();
    assert_eq!(r.core.state(), RobotState::Emergency);
    r.core.step().unwrap();
    assert!(!latch.is_engaged());

    // Forced disengage leaves the reset pending.
    let rep = r.core.step().unwrap();
    assert!(rep.reset_performed);
    assert_eq!(rep.state, RobotState::Initial);
    assert_eq!(rep.reading.raw_mv, 0.0);
    assert_eq!(r.core.last_command(), None);
    assert!(!r.primary.state().enabled && !r.secondary.state().enabled);
    assert!(!r.engaged_led.is_on());

    // Exactly once.
    assert!(!r.core.step().unwrap().reset_performed);

    r.sensor.set_millivolts(1000.0, FULL_SCALE_MV);
    latch.on_edge();
    assert_eq!(r.core.step().unwrap().state, RobotState::Execution);
    let rep = r.core.step().unwrap();
    assert_eq!(rep.state, RobotState::Execution);
    let d = 25_740.0 / (1000.0 - 29.37);
    assert!((rep.command.unwrap() - (d - 10.0) / 25.0).abs() < 1e-3);
    assert_eq!(r.primary.state().enable_calls, 2);
}

#[test]
fn manual_toggle_off_also_resets_once() {
    let mut r = rig(1000.0);
    let latch = r.core.latch();
    latch.on_edge();
    r.core.step().unwrap();
    r.core.step().unwrap();
    assert!(r.core.last_command().is_some());

    latch.on_edge();
    let rep = r.core.step().unwrap();
    assert!(!rep.engaged);
    assert!(rep.reset_performed);
    assert!(!r.primary.state().enabled);
    assert!(!r.core.step().unwrap().reset_performed);
}

#[test]
fn sleep_button_pauses_commands() {
    let mut r = rig(1000.0);
    r.core.latch().on_edge();
    r.core.step().unwrap();
    r.button.press();
    let rep = r.core.step().unwrap();
    assert_eq!(rep.state, RobotState::Sleep);
    r.button.release();
    let before = r.primary.state().commands;
    for _ in 0..3 {
        let rep = r.core.step().unwrap();
        assert_eq!(rep.state, RobotState::Sleep);
        assert_eq!(rep.command, None);
    }
    assert_eq!(r.primary.state().commands, before);
}

#[test]
fn singular_reading_forwards_sentinel() {
    // Full scale 1000 mV and b = -500 put the singularity at half scale.
    let diag = RecordingSink::default();
    let primary = SimulatedServo::new(PulseCalibration::default());
    let mut core = ControllerBuilder::new()
        .with_sensor(SimulatedSensor::new(0.5))
        .with_button(SimulatedButton::new())
        .with_actuators(
            primary.clone(),
            SimulatedServo::new(PulseCalibration::default()),
        )
        .with_range(OperatingRange::default())
        .with_compensator(SensorCompensator::new(25_740.0, -500.0, 1000.0))
        .with_diagnostics(Box::new(diag.clone()))
        .build()
        .unwrap();
    core.latch().on_edge();
    core.step().unwrap();

    let rep = core.step().unwrap();
    assert_eq!(rep.reading.distance_cm, INVALID_DISTANCE_CM);
    // Below min_cm, so the command goes negative and no emergency fires.
    assert!((rep.command.unwrap() - (-0.44)).abs() < 1e-6);
    assert_eq!(rep.state, RobotState::Execution);
    assert_eq!(primary.state().last_command, rep.command);
    assert_eq!(*diag.0.borrow().last().unwrap(), (500.0, -1.0));
}

struct FailingSensor;

impl AnalogSensor for FailingSensor {
    fn read(&mut self) -> HwResult<f32> {
        Err(Box::<dyn Error + Send + Sync>::from("adc not responding"))
    }
}

#[test]
fn sensor_fault_surfaces_as_typed_error() {
    let mut core = ControllerBuilder::new()
        .with_sensor(FailingSensor)
        .with_button(SimulatedButton::new())
        .with_actuators(
            SimulatedServo::new(PulseCalibration::default()),
            SimulatedServo::new(PulseCalibration::default()),
        )
        .with_range(OperatingRange::default())
        .build()
        .unwrap();
    core.latch().on_edge();
    let err = core.step().unwrap_err();
    match err.downcast_ref::<RangerError>() {
        Some(RangerError::Hardware(msg)) => assert!(msg.contains("adc not responding")),
        other => panic!("unexpected error: {other:?} ({err:#})"),
    }
    assert!(format!("{err:#}").contains("reading analog sensor"));
}

struct BrokenLed;

impl Indicator for BrokenLed {
    fn set(&mut self, _on: bool) -> HwResult<()> {
        Err("gpio gone".into())
    }
    fn is_on(&self) -> bool {
        false
    }
}

#[test]
fn indicator_failures_are_not_fatal() {
    let mut core = ControllerBuilder::new()
        .with_sensor(SimulatedSensor::from_millivolts(1000.0, FULL_SCALE_MV))
        .with_button(SimulatedButton::new())
        .with_actuators(
            SimulatedServo::new(PulseCalibration::default()),
            SimulatedServo::new(PulseCalibration::default()),
        )
        .with_range(OperatingRange::default())
        .with_heartbeat(Box::new(BrokenLed))
        .with_engaged_led(Box::new(BrokenLed))
        .build()
        .unwrap();
    core.latch().on_edge();
    for _ in 0..3 {
        core.step().unwrap();
    }
    assert_eq!(core.state(), RobotState::Execution);
}

#[test]
fn shutdown_disables_actuators() {
    let mut r = rig(1000.0);
    r.core.latch().on_edge();
    r.core.step().unwrap();
    assert!(r.core.actuators().all_enabled());
    r.core.shutdown();
    assert!(!r.primary.state().enabled);
    assert!(!r.secondary.state().enabled);
}
