use ranger_core::{BuildError, ControllerBuilder, OperatingRange};
use ranger_hardware::{PulseCalibration, SimulatedButton, SimulatedSensor, SimulatedServo};

type Builder = ControllerBuilder<SimulatedSensor, SimulatedButton, SimulatedServo>;

fn servo() -> SimulatedServo {
    SimulatedServo::new(PulseCalibration::default())
}

fn expect_build_error(b: Builder) -> BuildError {
    let err = b.build().expect_err("build should fail");
    err.downcast_ref::<BuildError>()
        .cloned()
        .unwrap_or_else(|| panic!("not a BuildError: {err:#}"))
}

#[test]
fn missing_sensor() {
    let e = expect_build_error(
        Builder::new()
            .with_button(SimulatedButton::new())
            .with_actuators(servo(), servo())
            .with_range(OperatingRange::default()),
    );
    assert!(matches!(e, BuildError::MissingSensor));
}

#[test]
fn missing_button() {
    let e = expect_build_error(
        Builder::new()
            .with_sensor(SimulatedSensor::new(0.3))
            .with_actuators(servo(), servo())
            .with_range(OperatingRange::default()),
    );
    assert!(matches!(e, BuildError::MissingButton));
}

#[test]
fn missing_actuators() {
    let e = expect_build_error(
        Builder::new()
            .with_sensor(SimulatedSensor::new(0.3))
            .with_button(SimulatedButton::new())
            .with_range(OperatingRange::default()),
    );
    assert!(matches!(e, BuildError::MissingActuators));
}

#[test]
fn missing_range() {
    let e = expect_build_error(
        Builder::new()
            .with_sensor(SimulatedSensor::new(0.3))
            .with_button(SimulatedButton::new())
            .with_actuators(servo(), servo()),
    );
    assert!(matches!(e, BuildError::MissingRange));
}

#[test]
fn degenerate_range_is_rejected_before_any_loop() {
    let e = OperatingRange::new(20.0, 20.0).unwrap_err();
    assert!(matches!(e, BuildError::InvalidConfig(_)));
}

#[test]
fn config_supplies_range_and_compensation() {
    let cfg = ranger_config::load_toml(
        r#"
        [pins]
        button_edge = 17
        button_level = 27
        heartbeat_led = 22
        servo_primary = 0
        servo_secondary = 1

        [range]
        min_cm = 5.0
        max_cm = 25.0
        "#,
    )
    .unwrap();
    let core = Builder::new()
        .with_config(&cfg)
        .unwrap()
        .with_sensor(SimulatedSensor::new(0.3))
        .with_button(SimulatedButton::new())
        .with_actuators(servo(), servo())
        .build()
        .unwrap();
    assert_eq!(core.compensator().b, -29.37);
    assert_eq!(core.reading().distance_cm, 0.0);
}
