//! Human-readable error descriptions, exit codes and structured JSON errors.

use ranger_core::error::{BuildError, RangerError};

/// Configuration or controller assembly problem.
pub const EXIT_CONFIG: i32 = 3;
/// Device fault at init or during the loop.
pub const EXIT_HARDWARE: i32 = 4;
pub const EXIT_OTHER: i32 = 1;

/// Stable error kind names for JSON output.
fn kind(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some()
    {
        return "Config";
    }
    match err.downcast_ref::<RangerError>() {
        Some(RangerError::Hardware(_) | RangerError::HardwareFault(_)) => "Hardware",
        Some(RangerError::State(_)) => "State",
        None if is_config_message(err) => "Config",
        None => "Error",
    }
}

fn is_config_message(err: &eyre::Report) -> bool {
    err.chain().any(|e| {
        let m = e.to_string();
        m.contains("config") || m.contains("range.") || m.contains("pins.")
    })
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => "What happened: No analog sensor was provided to the controller.\nLikely causes: The ADC failed to initialize.\nHow to fix: Check SPI is enabled and sensor.adc_channel is correct.".to_string(),
            BuildError::MissingButton => "What happened: No level button was provided to the controller.\nLikely causes: GPIO init failed for pins.button_level.\nHow to fix: Verify the pin number and GPIO permissions.".to_string(),
            BuildError::MissingActuators => "What happened: No servos were provided to the controller.\nLikely causes: PWM channels failed to initialize.\nHow to fix: Enable the PWM overlay and check pins.servo_primary/servo_secondary.".to_string(),
            BuildError::MissingRange => "What happened: No operating range was configured.\nHow to fix: Add a [range] section with min_cm < max_cm.".to_string(),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        return format!(
            "What happened: The config file is not valid TOML for this program.\nDetails: {}\nHow to fix: Compare the file against etc/ranger.toml.",
            te.message()
        );
    }

    if let Some(re) = err.downcast_ref::<RangerError>() {
        return match re {
            RangerError::Hardware(m) | RangerError::HardwareFault(m) => format!(
                "What happened: A device stopped responding ({m}).\nLikely causes: Loose wiring, missing power, or the bus is owned by another process.\nHow to fix: Check the sensor and servo wiring; both servos were disabled before exit."
            ),
            RangerError::State(m) => format!(
                "What happened: A device was used in the wrong state ({m}).\nHow to fix: Re-run with --log-level=debug and report the log."
            ),
        };
    }

    let msg = format!("{err:#}");
    if is_config_message(err) {
        return format!(
            "What happened: Configuration is invalid or unreadable.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again."
        );
    }

    format!(
        "Something went wrong: {msg}\nHow to fix: Re-run with --log-level=debug for details."
    )
}

pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match kind(err) {
        "Config" => EXIT_CONFIG,
        "Hardware" => EXIT_HARDWARE,
        _ => EXIT_OTHER,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": kind(err),
        "message": humanize(err),
        "chain": err.chain().map(ToString::to_string).collect::<Vec<_>>(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_faults_map_to_hardware_exit() {
        let e = eyre::Report::new(RangerError::HardwareFault("spi".into()))
            .wrap_err("reading analog sensor");
        assert_eq!(exit_code_for_error(&e), EXIT_HARDWARE);
        assert!(humanize(&e).contains("device stopped responding"));
    }

    #[test]
    fn build_errors_map_to_config_exit() {
        let e = eyre::Report::new(BuildError::InvalidConfig("range min_cm must be < max_cm"));
        assert_eq!(exit_code_for_error(&e), EXIT_CONFIG);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Config");
    }

    #[test]
    fn unknown_errors_are_generic() {
        let e = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&e), EXIT_OTHER);
        assert!(humanize(&e).contains("boom"));
    }
}
