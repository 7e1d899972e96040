//! Angle unit conversions.

use std::f64::consts::PI;

#[inline]
pub fn degrees_to_radians(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

#[inline]
pub fn radians_to_degrees(rad: f64) -> f64 {
    rad * (180.0 / PI)
}
