//! Maps `Box<dyn Error>` from trait boundaries to typed `RangerError`.
//!
//! The traits in `ranger_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `ranger_hardware::HwError` downcasting.

use crate::error::RangerError;

/// Map a trait-boundary error to a typed `RangerError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> RangerError {
    #[cfg(feature = "hardware-errors")]
    {
        use ranger_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::NotEnabled => RangerError::State(hw.to_string()),
                other => RangerError::HardwareFault(other.to_string()),
            };
        }
    }

    RangerError::Hardware(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_errors_map_to_hardware() {
        let e: Box<dyn std::error::Error + Send + Sync> = "spi bus busy".into();
        match map_hw_error(&*e) {
            RangerError::Hardware(msg) => assert!(msg.contains("spi bus busy")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_downcast() {
        use ranger_hardware::error::HwError;
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::Pwm("busy".into()));
        assert!(matches!(map_hw_error(&*e), RangerError::HardwareFault(_)));
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::NotEnabled);
        assert!(matches!(map_hw_error(&*e), RangerError::State(_)));
    }
}
