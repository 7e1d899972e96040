use proptest::prelude::*;
use rudder_core::{CalibrationPoint, apply, degrees_to_radians, radians_to_degrees, solve_linear};

fn close(a: f64, b: f64, scale: f64) -> bool {
    (a - b).abs() <= 1e-6 * scale.max(1.0)
}

prop_compose! {
    // Two calibration points whose x values are meaningfully apart.
    fn calibration_pair()(
        x1 in -1.0e4f64..1.0e4,
        gap in 1.0e-2f64..1.0e4,
        sign in prop::bool::ANY,
        y1 in -1.0e4f64..1.0e4,
        y2 in -1.0e4f64..1.0e4,
    ) -> (CalibrationPoint, CalibrationPoint) {
        let x2 = if sign { x1 + gap } else { x1 - gap };
        (CalibrationPoint::new(x1, y1), CalibrationPoint::new(x2, y2))
    }
}

proptest! {
    #[test]
    fn line_passes_through_both_points((p1, p2) in calibration_pair()) {
        let c = solve_linear(p1, p2).unwrap();
        let scale = p1.y.abs().max(p2.y.abs()) + c.slope.abs() * p1.x.abs().max(p2.x.abs());
        prop_assert!(close(apply(&c, p1.x), p1.y, scale), "p1 {:?} -> {}", p1, apply(&c, p1.x));
        prop_assert!(close(apply(&c, p2.x), p2.y, scale), "p2 {:?} -> {}", p2, apply(&c, p2.x));
    }

    #[test]
    fn swapping_points_gives_same_line((p1, p2) in calibration_pair(), x in -1.0e4f64..1.0e4) {
        let a = solve_linear(p1, p2).unwrap();
        let b = solve_linear(p2, p1).unwrap();
        let scale = a.slope.abs() * (x.abs() + p1.x.abs() + p2.x.abs()) + a.intercept.abs();
        prop_assert!(close(a.apply(x), b.apply(x), scale));
    }

    #[test]
    fn identical_x_always_rejected(x in -1.0e6f64..1.0e6, y1 in -1.0e3f64..1.0e3, y2 in -1.0e3f64..1.0e3) {
        let r = solve_linear(CalibrationPoint::new(x, y1), CalibrationPoint::new(x, y2));
        prop_assert!(matches!(r, Err(rudder_core::CoreError::InvalidCalibration(_))));
    }

    #[test]
    fn degrees_radians_round_trip(x in -1.0e9f64..1.0e9) {
        let back = radians_to_degrees(degrees_to_radians(x));
        prop_assert!((back - x).abs() <= 4.0 * f64::EPSILON * x.abs().max(1.0));
    }
}
