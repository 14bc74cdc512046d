use proptest::prelude::*;
use ranger_core::{INVALID_DISTANCE_CM, OperatingRange, SensorCompensator, ToggleLatch, map};

proptest! {
    #[test]
    fn compensate_matches_fit_away_from_singularity(
        a in 1_000.0f32..50_000.0,
        b in -100.0f32..100.0,
        raw in 0.0f32..3300.0,
    ) {
        prop_assume!((raw + b).abs() > 1e-3);
        let c = SensorCompensator::new(a, b, 3300.0);
        let d = c.compensate(raw);
        let expected = a / (raw + b);
        prop_assert!((d - expected).abs() <= expected.abs() * 1e-5);
    }

    #[test]
    fn compensate_at_negated_offset_is_sentinel(b in -3000.0f32..-1.0) {
        let c = SensorCompensator::new(25_740.0, b, 3300.0);
        prop_assert_eq!(c.compensate(-b), INVALID_DISTANCE_CM);
    }

    #[test]
    fn map_is_affine_with_unit_endpoints(
        min in -100.0f32..100.0,
        span in 0.5f32..200.0,
        t in -1.0f32..2.0,
    ) {
        let max = min + span;
        let r = OperatingRange::new(min, max).unwrap();
        prop_assert!(map(min, &r).abs() < 1e-4);
        prop_assert!((map(max, &r) - 1.0).abs() < 1e-4);
        let d = min + t * span;
        prop_assert!((map(d, &r) - t).abs() < 1e-3);
    }

    #[test]
    fn latch_engaged_tracks_edge_parity(edges in 0usize..64) {
        let l = ToggleLatch::new();
        for _ in 0..edges {
            l.on_edge();
        }
        let s = l.snapshot();
        prop_assert_eq!(s.engaged, edges % 2 == 1);
        prop_assert_eq!(s.needs_reset_once, edges > 0);
    }
}
