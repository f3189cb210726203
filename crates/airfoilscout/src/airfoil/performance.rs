//! Closed-form performance estimation.
//!
//! Coarse approximations, not a panel method. Scores are defined in terms of
//! the constants below, including the truncated value of π.

use serde::{Deserialize, Serialize};

use super::profile::CoordinateSet;
use crate::error::{Error, Result};

/// The value of π the formulas are defined with.
#[allow(clippy::approx_constant)]
pub const PI_APPROX: f64 = 3.14159;

/// Air density at sea level in kg/m³.
pub const AIR_DENSITY: f64 = 1.225;

/// Oswald efficiency factor.
pub const OSWALD_EFFICIENCY: f64 = 0.85;

/// Kinematic viscosity of air at sea level in m²/s.
pub const KINEMATIC_VISCOSITY: f64 = 1.46e-5;

/// Speed of sound in m/s.
pub const SPEED_OF_SOUND: f64 = 343.0;

/// Angle of attack (degrees) from which the stall clamp applies.
pub const STALL_ALPHA_DEG: f64 = 15.0;

/// Maximum lift coefficient once stalled.
pub const STALL_MAX_CL: f64 = 1.5;

const BASE_PROFILE_DRAG: f64 = 0.025;
const CAMBER_DRAG_FACTOR: f64 = 0.005;

/// Flight conditions shared by every candidate in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightParameters {
    /// Aircraft weight.
    pub weight: f64,
    /// Characteristic (chord) length in m.
    pub length: f64,
    /// Wingspan in m.
    pub wingspan: f64,
    /// Cruise speed in m/s.
    pub speed: f64,
    /// Angle of attack in degrees.
    pub alpha: f64,
}

impl FlightParameters {
    /// Create a new set of flight parameters.
    #[must_use]
    pub fn new(weight: f64, length: f64, wingspan: f64, speed: f64, alpha: f64) -> Self {
        Self {
            weight,
            length,
            wingspan,
            speed,
            alpha,
        }
    }

    /// Wing area as the product of wingspan and length.
    #[must_use]
    pub fn wing_area(&self) -> f64 {
        self.wingspan * self.length
    }

    /// Aspect ratio.
    ///
    /// Computed as `wingspan² / (wingspan · length)`, which reduces to
    /// `wingspan / length` up to rounding.
    // NOTE: the quadratic form suggests wing area was meant to be something
    // other than wingspan · length. Left as is until that is confirmed.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.wingspan.powi(2) / (self.wingspan * self.length)
    }

    /// Angle of attack in radians.
    #[must_use]
    pub fn alpha_rad(&self) -> f64 {
        self.alpha * (PI_APPROX / 180.0)
    }

    /// Check if the stall clamp applies.
    #[must_use]
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn is_stalled(&self) -> bool {
        // A NaN angle counts as stalled.
        !(self.alpha < STALL_ALPHA_DEG)
    }
}

/// Derived metrics for one airfoil under one set of flight parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Maximum lift coefficient.
    pub max_cl: f64,
    /// Lift coefficient required for level flight.
    pub required_cl: f64,
    /// Maximum drag coefficient.
    pub max_cd: f64,
    /// Lift-to-drag ratio, the ranking score.
    pub ld_ratio: f64,
    /// Reynolds number.
    pub reynolds_number: f64,
    /// Mach number.
    pub mach_number: f64,
}

impl PerformanceRecord {
    /// The ranking score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.ld_ratio
    }
}

/// Estimate the performance of an outline under the given flight parameters.
///
/// # Errors
///
/// Returns [`Error::Data`] if the outline has fewer than two points or if
/// any denominator (length, wingspan, speed, the first chordwise step, or the
/// resulting drag coefficient) is exactly zero.
pub fn estimate(coordinates: &CoordinateSet, params: &FlightParameters) -> Result<PerformanceRecord> {
    let points = coordinates.points();
    if points.len() < 2 {
        return Err(Error::data(format!(
            "need at least 2 coordinate points, got {}",
            points.len()
        )));
    }
    nonzero(params.wingspan, "wingspan")?;
    nonzero(params.length, "length")?;
    nonzero(params.speed, "speed")?;

    let aspect_ratio = params.aspect_ratio();

    let (min_y, max_y) = coordinates
        .y_bounds()
        .ok_or_else(|| Error::internal("bounds of a non-empty coordinate set"))?;
    let camber = (max_y - min_y) / 2.0;

    let (first, second) = (points[0], points[1]);
    let leading_edge_slope = (second.y - first.y) / nonzero(second.x - first.x, "leading-edge dx")?;

    let max_cl = if params.is_stalled() {
        STALL_MAX_CL
    } else {
        2.0 * PI_APPROX * params.alpha_rad() * (1.0 + leading_edge_slope)
    };

    let required_cl =
        (2.0 * params.weight) / (AIR_DENSITY * params.speed.powi(2) * params.wing_area());

    let zero_lift_cd = BASE_PROFILE_DRAG + CAMBER_DRAG_FACTOR * camber;
    let max_cd =
        zero_lift_cd + max_cl.powi(2) / (PI_APPROX * OSWALD_EFFICIENCY * aspect_ratio);
    let ld_ratio = max_cl / nonzero(max_cd, "max_cd")?;

    Ok(PerformanceRecord {
        max_cl,
        required_cl,
        max_cd,
        ld_ratio,
        reynolds_number: params.speed * params.wingspan / KINEMATIC_VISCOSITY,
        mach_number: params.speed / SPEED_OF_SOUND,
    })
}

#[allow(clippy::float_cmp)]
fn nonzero(value: f64, what: &str) -> Result<f64> {
    if value == 0.0 {
        Err(Error::data(format!("{what} is zero")))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::approx_constant)]
mod tests {
    use super::*;
    use crate::airfoil::Point;
    use proptest::prelude::*;

    fn symmetric_foil() -> CoordinateSet {
        CoordinateSet::new(vec![
            Point::new(1.0, 0.0),
            Point::new(0.5, 0.06),
            Point::new(0.0, 0.0),
            Point::new(0.5, -0.06),
            Point::new(1.0, 0.0),
        ])
    }

    fn params() -> FlightParameters {
        FlightParameters::new(50.0, 0.25, 2.0, 15.0, 5.0)
    }

    #[test]
    fn test_estimate_matches_hand_computation() {
        let coords = symmetric_foil();
        let p = params();
        let record = estimate(&coords, &p).unwrap();

        let ar = 2.0_f64 * 2.0 / (2.0 * 0.25);
        let camber = (0.06 - -0.06) / 2.0;
        let slope = (0.06 - 0.0) / (0.5 - 1.0);
        let alpha_rad = 5.0 * (3.14159 / 180.0);
        let max_cl = 2.0 * 3.14159 * alpha_rad * (1.0 + slope);
        let cd0 = 0.025 + 0.005 * camber;
        let max_cd = cd0 + max_cl * max_cl / (3.14159 * 0.85 * ar);

        assert_eq!(record.max_cl, max_cl);
        assert_eq!(record.max_cd, max_cd);
        assert_eq!(record.ld_ratio, max_cl / max_cd);
        assert_eq!(
            record.required_cl,
            (2.0 * 50.0) / (1.225 * 15.0_f64.powi(2) * (2.0 * 0.25))
        );
        assert_eq!(record.reynolds_number, 15.0 * 2.0 / 1.46e-5);
        assert_eq!(record.mach_number, 15.0 / 343.0);
    }

    #[test]
    fn test_aspect_ratio_literal_form() {
        let p = FlightParameters::new(1.0, 0.3, 1.7, 10.0, 2.0);
        assert_eq!(p.aspect_ratio(), 1.7_f64.powi(2) / (1.7 * 0.3));
    }

    #[test]
    fn test_stall_clamp_at_threshold() {
        let mut p = params();
        p.alpha = 15.0;
        let record = estimate(&symmetric_foil(), &p).unwrap();
        assert_eq!(record.max_cl, STALL_MAX_CL);

        p.alpha = 14.999;
        let record = estimate(&symmetric_foil(), &p).unwrap();
        assert_ne!(record.max_cl, STALL_MAX_CL);
    }

    #[test]
    fn test_estimate_requires_two_points() {
        let coords = CoordinateSet::new(vec![Point::new(0.0, 0.0)]);
        let err = estimate(&coords, &params()).unwrap_err();
        assert!(matches!(err, Error::Data { .. }));
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_estimate_rejects_zero_denominators() {
        let coords = symmetric_foil();

        let mut p = params();
        p.wingspan = 0.0;
        assert!(matches!(estimate(&coords, &p), Err(Error::Data { .. })));

        let mut p = params();
        p.length = 0.0;
        assert!(matches!(estimate(&coords, &p), Err(Error::Data { .. })));

        let mut p = params();
        p.speed = 0.0;
        assert!(matches!(estimate(&coords, &p), Err(Error::Data { .. })));
    }

    #[test]
    fn test_estimate_rejects_vertical_leading_edge() {
        let coords = CoordinateSet::new(vec![Point::new(0.0, 0.0), Point::new(0.0, 0.1)]);
        let err = estimate(&coords, &params()).unwrap_err();
        assert!(err.to_string().contains("leading-edge"));
    }

    #[test]
    fn test_zero_alpha_gives_zero_lift() {
        let mut p = params();
        p.alpha = 0.0;
        let record = estimate(&symmetric_foil(), &p).unwrap();
        assert_eq!(record.max_cl, 0.0);
        assert_eq!(record.ld_ratio, 0.0);
    }

    fn coordinate_strategy() -> impl Strategy<Value = CoordinateSet> {
        prop::collection::vec((-1.0f64..2.0, -0.5f64..0.5), 2..40).prop_filter_map(
            "distinct leading x",
            |pts| {
                if pts[0].0 == pts[1].0 {
                    None
                } else {
                    Some(pts.into_iter().map(|(x, y)| Point::new(x, y)).collect())
                }
            },
        )
    }

    fn params_strategy() -> impl Strategy<Value = FlightParameters> {
        (
            0.1f64..1000.0,
            0.01f64..5.0,
            0.1f64..30.0,
            0.5f64..300.0,
            -10.0f64..30.0,
        )
            .prop_map(|(w, l, s, v, a)| FlightParameters::new(w, l, s, v, a))
    }

    proptest! {
        #[test]
        fn max_cd_positive(coords in coordinate_strategy(), p in params_strategy()) {
            let record = estimate(&coords, &p).unwrap();
            prop_assert!(record.max_cd > 0.0);
        }

        #[test]
        fn ld_ratio_is_exact_quotient(coords in coordinate_strategy(), p in params_strategy()) {
            let record = estimate(&coords, &p).unwrap();
            prop_assert_eq!(record.ld_ratio, record.max_cl / record.max_cd);
        }

        #[test]
        fn stalled_lift_is_fixed(coords in coordinate_strategy(), p in params_strategy(), alpha in 15.0f64..90.0) {
            let p = FlightParameters { alpha, ..p };
            let record = estimate(&coords, &p).unwrap();
            prop_assert_eq!(record.max_cl, 1.5);
        }
    }
}
