//! Pipeline stages.
//!
//! A stage is a pure `f64 -> f64` mapping with a name used in logs and
//! diagnostics. Stages hold configuration only; `apply` takes `&self` so a
//! stage can be shared across threads as long as the pipeline owning it is
//! driven by one thread at a time.

use crate::calibration::{CalibrationPoint, LinearCoefficients, solve_linear};
use crate::error::CoreError;
use crate::units::{degrees_to_radians, radians_to_degrees};

pub trait Transform: Send {
    fn name(&self) -> &str;
    fn apply(&self, x: f64) -> Result<f64, CoreError>;
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn apply(&self, x: f64) -> Result<f64, CoreError> {
        (**self).apply(x)
    }
}

/// `y = slope * x + intercept`.
#[derive(Debug, Clone)]
pub struct Linear {
    name: String,
    coeffs: LinearCoefficients,
}

impl Linear {
    pub fn new(name: impl Into<String>, coeffs: LinearCoefficients) -> Self {
        Self {
            name: name.into(),
            coeffs,
        }
    }

    /// Fit the stage to two calibration points.
    pub fn from_points(
        name: impl Into<String>,
        point1: CalibrationPoint,
        point2: CalibrationPoint,
    ) -> Result<Self, CoreError> {
        Ok(Self::new(name, solve_linear(point1, point2)?))
    }

    pub fn coefficients(&self) -> LinearCoefficients {
        self.coeffs
    }
}

impl Transform for Linear {
    fn name(&self) -> &str {
        &self.name
    }
    fn apply(&self, x: f64) -> Result<f64, CoreError> {
        Ok(self.coeffs.apply(x))
    }
}

/// Multiplies by a constant gain (e.g. millivolts to volts with 0.001).
#[derive(Debug, Clone)]
pub struct Gain {
    name: String,
    factor: f64,
}

impl Gain {
    pub fn new(name: impl Into<String>, factor: f64) -> Self {
        Self {
            name: name.into(),
            factor,
        }
    }
}

impl Transform for Gain {
    fn name(&self) -> &str {
        &self.name
    }
    fn apply(&self, x: f64) -> Result<f64, CoreError> {
        Ok(x * self.factor)
    }
}

#[derive(Debug, Clone)]
pub struct DegreesToRadians {
    name: String,
}

impl DegreesToRadians {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for DegreesToRadians {
    fn default() -> Self {
        Self::new("degrees to radians")
    }
}

impl Transform for DegreesToRadians {
    fn name(&self) -> &str {
        &self.name
    }
    fn apply(&self, x: f64) -> Result<f64, CoreError> {
        Ok(degrees_to_radians(x))
    }
}

#[derive(Debug, Clone)]
pub struct RadiansToDegrees {
    name: String,
}

impl RadiansToDegrees {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for RadiansToDegrees {
    fn default() -> Self {
        Self::new("radians to degrees")
    }
}

impl Transform for RadiansToDegrees {
    fn name(&self) -> &str {
        &self.name
    }
    fn apply(&self, x: f64) -> Result<f64, CoreError> {
        Ok(radians_to_degrees(x))
    }
}

/// Recovers the lower resistor (R2) of a divider from its output voltage.
///
/// ```text
///  vin ── R1 ──┬── vout
///              R2
///  gnd ────────┘
/// ```
///
/// `R2 = vout * R1 / (vin - vout)`. Output voltages outside `[0, vin)` have
/// no physical resistance and are rejected as `InvalidInput`.
#[derive(Debug, Clone)]
pub struct VoltageDivider {
    name: String,
    r1_ohms: f64,
    vin_volts: f64,
}

impl VoltageDivider {
    pub fn new(name: impl Into<String>, r1_ohms: f64, vin_volts: f64) -> Self {
        Self {
            name: name.into(),
            r1_ohms,
            vin_volts,
        }
    }

    pub fn r1_ohms(&self) -> f64 {
        self.r1_ohms
    }

    pub fn vin_volts(&self) -> f64 {
        self.vin_volts
    }
}

impl Transform for VoltageDivider {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, vout: f64) -> Result<f64, CoreError> {
        if vout < 0.0 {
            return Err(CoreError::InvalidInput {
                stage: self.name.clone(),
                value: vout,
                reason: "divider output voltage is negative",
            });
        }
        if vout >= self.vin_volts {
            return Err(CoreError::InvalidInput {
                stage: self.name.clone(),
                value: vout,
                reason: "divider output voltage is at or above supply",
            });
        }
        Ok(vout * self.r1_ohms / (self.vin_volts - vout))
    }
}

/// Named closure stage.
pub struct Lambda {
    name: String,
    f: Box<dyn Fn(f64) -> f64 + Send>,
}

impl Lambda {
    pub fn new(name: impl Into<String>, f: impl Fn(f64) -> f64 + Send + 'static) -> Self {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }
}

impl core::fmt::Debug for Lambda {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Lambda").field("name", &self.name).finish()
    }
}

impl Transform for Lambda {
    fn name(&self) -> &str {
        &self.name
    }
    fn apply(&self, x: f64) -> Result<f64, CoreError> {
        Ok((self.f)(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divider_midpoint_equals_r1() {
        let d = VoltageDivider::new("divider", 47.0, 3.3);
        let r2 = d.apply(1.65).unwrap();
        assert!((r2 - 47.0).abs() < 1e-9);
    }

    #[test]
    fn divider_zero_volts_is_zero_ohms() {
        let d = VoltageDivider::new("divider", 47.0, 3.3);
        assert_eq!(d.apply(0.0).unwrap(), 0.0);
    }

    #[test]
    fn divider_rejects_supply_voltage() {
        let d = VoltageDivider::new("divider", 47.0, 3.3);
        let err = d.apply(3.3).unwrap_err();
        assert_eq!(err.stage(), Some("divider"));
        assert!(d.apply(-0.1).is_err());
    }

    #[test]
    fn linear_from_points_propagates_calibration_error() {
        let err = Linear::from_points(
            "deg",
            CalibrationPoint::new(1.0, 0.0),
            CalibrationPoint::new(1.0, 5.0),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidCalibration(_)));
    }

    #[test]
    fn lambda_and_gain_apply() {
        let l = Lambda::new("negate", |x| -x);
        assert_eq!(l.apply(2.5).unwrap(), -2.5);
        assert_eq!(l.name(), "negate");
        let g = Gain::new("mV to V", 0.001);
        assert!((g.apply(1650.0).unwrap() - 1.65).abs() < 1e-12);
    }
}
