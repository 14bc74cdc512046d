//! Conversions from `ranger_config` sections to core types.

use std::time::Duration;

use crate::compensation::SensorCompensator;
use crate::error::BuildError;
use crate::mapping::OperatingRange;

impl TryFrom<&ranger_config::RangeCfg> for OperatingRange {
    type Error = BuildError;

    fn try_from(c: &ranger_config::RangeCfg) -> Result<Self, Self::Error> {
        Self::new(c.min_cm, c.max_cm)
    }
}

impl TryFrom<&ranger_config::SensorCfg> for SensorCompensator {
    type Error = BuildError;

    fn try_from(c: &ranger_config::SensorCfg) -> Result<Self, Self::Error> {
        if !c.fit_a.is_finite() || !c.fit_b.is_finite() {
            return Err(BuildError::InvalidConfig("sensor fit must be finite"));
        }
        if !(c.full_scale_mv.is_finite() && c.full_scale_mv > 0.0) {
            return Err(BuildError::InvalidConfig("full_scale_mv must be > 0"));
        }
        Ok(Self::new(c.fit_a, c.fit_b, c.full_scale_mv))
    }
}

/// Longest accepted loop period.
pub const MAX_PERIOD_MS: u64 = 1_000;

/// Loop period; must lie in `1..=MAX_PERIOD_MS` milliseconds.
pub fn period(c: &ranger_config::ControlCfg) -> Result<Duration, BuildError> {
    if !(1..=MAX_PERIOD_MS).contains(&c.period_ms) {
        return Err(BuildError::InvalidConfig("period_ms must be in 1..=1000"));
    }
    Ok(Duration::from_millis(c.period_ms))
}
