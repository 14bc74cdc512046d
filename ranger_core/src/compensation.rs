//! IR sensor linearization.
//!
//! The GP2Y0A41 output is roughly inversely proportional to distance. A fitted
//! curve `distance_cm = a / (mv + b)` turns the raw millivolt reading into
//! centimetres.

/// Returned when `mv + b == 0` and the curve is undefined.
pub const INVALID_DISTANCE_CM: f32 = -1.0;

/// Fitted numerator (cm·mV) of the reference sensor.
pub const DEFAULT_FIT_A: f32 = 25_740.0;
/// Fitted millivolt offset of the reference sensor.
pub const DEFAULT_FIT_B: f32 = -29.37;
/// ADC full scale in millivolts.
pub const DEFAULT_FULL_SCALE_MV: f32 = 3300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorCompensator {
    pub a: f32,
    pub b: f32,
    pub full_scale_mv: f32,
}

impl SensorCompensator {
    pub fn new(a: f32, b: f32, full_scale_mv: f32) -> Self {
        Self { a, b, full_scale_mv }
    }

    /// Scale a normalized ADC reading to millivolts.
    #[inline]
    pub fn to_millivolts(&self, normalized: f32) -> f32 {
        normalized * self.full_scale_mv
    }

    /// Distance in cm for a raw millivolt reading, or `INVALID_DISTANCE_CM`.
    #[inline]
    pub fn compensate(&self, raw_mv: f32) -> f32 {
        let denom = raw_mv + self.b;
        if denom == 0.0 {
            INVALID_DISTANCE_CM
        } else {
            self.a / denom
        }
    }

    /// Convert a normalized reading into a full `SensorReading`.
    pub fn reading(&self, normalized: f32) -> SensorReading {
        let raw_mv = self.to_millivolts(normalized);
        SensorReading {
            raw_mv,
            distance_cm: self.compensate(raw_mv),
        }
    }
}

impl Default for SensorCompensator {
    fn default() -> Self {
        Self::new(DEFAULT_FIT_A, DEFAULT_FIT_B, DEFAULT_FULL_SCALE_MV)
    }
}

/// Last sensor sample as seen by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReading {
    pub raw_mv: f32,
    pub distance_cm: f32,
}

impl SensorReading {
    pub fn is_valid(&self) -> bool {
        self.distance_cm != INVALID_DISTANCE_CM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_reading_500_mv() {
        let c = SensorCompensator::default();
        let d = c.compensate(500.0);
        assert!((d - 25_740.0 / (500.0 - 29.37)).abs() < 1e-3);
    }

    #[test]
    fn singular_point_returns_sentinel() {
        let c = SensorCompensator::default();
        assert_eq!(c.compensate(29.37), INVALID_DISTANCE_CM);
        let r = SensorReading {
            raw_mv: 29.37,
            distance_cm: c.compensate(29.37),
        };
        assert!(!r.is_valid());
    }

    #[test]
    fn normalized_scales_to_full_scale() {
        let c = SensorCompensator::default();
        let r = c.reading(0.5);
        assert!((r.raw_mv - 1650.0).abs() < 1e-3);
        assert!(r.is_valid());
    }
}
