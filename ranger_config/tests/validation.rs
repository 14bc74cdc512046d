use ranger_config::load_toml;
use rstest::rstest;

const PINS: &str = r#"
[pins]
button_edge = 17
button_level = 27
heartbeat_led = 22
engaged_led = 23
servo_primary = 0
servo_secondary = 1
"#;

fn with_pins(extra: &str) -> String {
    format!("{PINS}\n{extra}")
}

#[test]
fn accepts_reference_configuration() {
    let toml = with_pins(
        r#"
[sensor]
adc_channel = 0
full_scale_mv = 3300.0
fit_a = 25740.0
fit_b = -29.37

[range]
min_cm = 10.0
max_cm = 35.0

[control]
period_ms = 10

[button]
active_low = true
debounce_ms = 50

[servo.primary]
pulse_min = 0.0150
pulse_max = 0.1150

[servo.secondary]
pulse_min = 0.0325
pulse_max = 0.1250
frequency_hz = 50.0

[logging]
level = "info"
rotation = "daily"
"#,
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.pins.engaged_led, Some(23));
}

#[rstest]
#[case("[range]\nmin_cm = 20.0\nmax_cm = 20.0\n", "must be < range.max_cm")]
#[case("[range]\nmin_cm = 40.0\nmax_cm = 20.0\n", "must be < range.max_cm")]
#[case("[range]\nmin_cm = nan\nmax_cm = 20.0\n", "must be finite")]
#[case("[control]\nperiod_ms = 0\n", "period_ms must be >= 1")]
#[case("[control]\nperiod_ms = 5000\n", "unreasonably large")]
#[case("[sensor]\nfit_a = 0.0\n", "fit_a must be finite and non-zero")]
#[case("[sensor]\nfull_scale_mv = -1.0\n", "full_scale_mv must be > 0")]
#[case("[sensor]\nadc_channel = 8\n", "adc_channel must be in 0..=7")]
#[case("[servo.primary]\npulse_min = 0.2\npulse_max = 0.1\n", "pulse_min must be < pulse_max")]
#[case("[servo.secondary]\npulse_min = 0.0\npulse_max = 0.1\n", "must be in (0.0, 1.0)")]
#[case("[button]\ndebounce_ms = 2000\n", "debounce_ms is unreasonably large")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_invalid_sections(#[case] extra: &str, #[case] needle: &str) {
    let cfg = load_toml(&with_pins(extra)).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "unexpected message: {msg}");
}

#[test]
fn rejects_shared_button_pin() {
    let toml = r#"
[pins]
button_edge = 17
button_level = 17
heartbeat_led = 22
servo_primary = 0
servo_secondary = 1
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("shared pin should be rejected");
    assert!(format!("{err}").contains("must differ"));
}

#[test]
fn rejects_unknown_pwm_channel() {
    let toml = r#"
[pins]
button_edge = 17
button_level = 27
heartbeat_led = 22
servo_primary = 2
servo_secondary = 1
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    assert!(cfg.validate().is_err());
}
