//! Two-point linear calibration.
//!
//! A sensor is calibrated by pairing two raw readings with the physical
//! values they represent, e.g. a potentiometer measuring 2.1 Ω at -50° and
//! 223 Ω at +50°. The pair is reduced to slope-intercept form
//! `y = slope * x + intercept`, which then maps every later reading.
//!
//! The mapping is valid for all reals: readings outside the calibrated
//! interval extrapolate along the same line and are never clamped.

use crate::error::CoreError;

/// One paired (raw input, physical output) sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    pub x: f64,
    pub y: f64,
}

impl CalibrationPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for CalibrationPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Slope-intercept coefficients derived from two calibration points.
///
/// Construct through [`solve_linear`] so the coefficients are known finite;
/// the fields stay public for callers that persist a fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearCoefficients {
    /// `slope * x + intercept`, unclamped.
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Raw input that maps to `y`. `None` for a flat line.
    pub fn invert(&self, y: f64) -> Option<f64> {
        if self.slope == 0.0 {
            return None;
        }
        Some((y - self.intercept) / self.slope)
    }
}

/// Derive slope and intercept from two calibration points.
///
/// Coincident x-coordinates would divide by zero; they are rejected with
/// `InvalidCalibration` rather than producing an infinite or NaN slope.
pub fn solve_linear(
    point1: CalibrationPoint,
    point2: CalibrationPoint,
) -> Result<LinearCoefficients, CoreError> {
    for (i, p) in [point1, point2].iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(CoreError::InvalidCalibration(format!(
                "point{} ({}, {}) is not finite",
                i + 1,
                p.x,
                p.y
            )));
        }
    }
    if point1.x == point2.x {
        return Err(CoreError::InvalidCalibration(format!(
            "calibration points share x = {}; two distinct inputs are required",
            point1.x
        )));
    }

    let slope = (point2.y - point1.y) / (point2.x - point1.x);
    let intercept = point1.y - slope * point1.x;
    if !(slope.is_finite() && intercept.is_finite()) {
        // Distinct but extremely close x values can still overflow.
        return Err(CoreError::InvalidCalibration(format!(
            "derived line is not finite (slope={slope}, intercept={intercept})"
        )));
    }
    tracing::debug!(slope, intercept, "solved two-point calibration");
    Ok(LinearCoefficients { slope, intercept })
}

/// Free-function form of [`LinearCoefficients::apply`].
#[inline]
pub fn apply(coeffs: &LinearCoefficients, x: f64) -> f64 {
    coeffs.apply(x)
}
