//! Distance → normalized actuator command.

use crate::error::BuildError;

/// Distance span that maps linearly onto the servo's [0, 1] command range.
///
/// Construction rejects degenerate or inverted spans, so `map` never divides
/// by zero at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingRange {
    min_cm: f32,
    max_cm: f32,
}

impl OperatingRange {
    pub fn new(min_cm: f32, max_cm: f32) -> Result<Self, BuildError> {
        if !min_cm.is_finite() || !max_cm.is_finite() {
            return Err(BuildError::InvalidConfig("range bounds must be finite"));
        }
        if min_cm >= max_cm {
            return Err(BuildError::InvalidConfig("range min_cm must be < max_cm"));
        }
        Ok(Self { min_cm, max_cm })
    }

    #[inline]
    pub fn min_cm(&self) -> f32 {
        self.min_cm
    }

    #[inline]
    pub fn max_cm(&self) -> f32 {
        self.max_cm
    }

    /// True when the distance is beyond the far end of the range.
    #[inline]
    pub fn exceeds_max(&self, distance_cm: f32) -> bool {
        distance_cm > self.max_cm
    }

    /// See [`map`].
    #[inline]
    pub fn map(&self, distance_cm: f32) -> f32 {
        map(distance_cm, self)
    }
}

impl Default for OperatingRange {
    fn default() -> Self {
        Self {
            min_cm: 10.0,
            max_cm: 35.0,
        }
    }
}

/// Linear map with `min_cm → 0.0` and `max_cm → 1.0`.
///
/// No clamping: distances outside the range yield commands outside [0, 1].
#[inline]
pub fn map(distance_cm: f32, range: &OperatingRange) -> f32 {
    (distance_cm - range.min_cm) / (range.max_cm - range.min_cm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10.0, 0.0)]
    #[case(35.0, 1.0)]
    #[case(22.5, 0.5)]
    #[case(40.0, 1.2)]
    #[case(5.0, -0.2)]
    fn maps_reference_range(#[case] d: f32, #[case] expected: f32) {
        let r = OperatingRange::default();
        assert!((r.map(d) - expected).abs() < 1e-6);
    }

    #[test]
    fn rejects_degenerate_and_inverted_ranges() {
        assert!(OperatingRange::new(20.0, 20.0).is_err());
        assert!(OperatingRange::new(30.0, 20.0).is_err());
        assert!(OperatingRange::new(f32::NAN, 20.0).is_err());
        assert!(OperatingRange::new(10.0, f32::INFINITY).is_err());
    }

    #[test]
    fn exceeds_max_is_strict() {
        let r = OperatingRange::default();
        assert!(!r.exceeds_max(35.0));
        assert!(r.exceeds_max(35.01));
    }
}
