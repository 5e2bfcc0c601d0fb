//! Normalised angle unit: one full turn is `1.0`.
//!
//! Conversions go through multiplication only, by fixed reciprocal
//! constants.

use crate::scalar::TWO_PI;

pub const ANGLE_ZERO: f32 = 0.0;
pub const ANGLE_TWO_PI: f32 = 1.0;
pub const ANGLE_PI: f32 = 0.5;
pub const ANGLE_PI_HALF: f32 = 0.25;
pub const ANGLE_PI_FOURTH: f32 = 0.125;

// 1/360 and 1/(2*PI).
const RECIP_360: f32 = 2.777_777_8e-3;
const RECIP_TWO_PI: f32 = 0.159_154_94;

#[inline]
pub fn angle_to_degrees(a: f32) -> f32 {
    360.0 * a
}

#[inline]
pub fn angle_to_radians(a: f32) -> f32 {
    TWO_PI * a
}

#[inline]
pub fn degrees_to_angle(degrees: f32) -> f32 {
    degrees * RECIP_360
}

#[inline]
pub fn radians_to_angle(radians: f32) -> f32 {
    radians * RECIP_TWO_PI
}

/// Radians to degrees through the angle unit.
#[inline]
pub fn radians_to_degrees(radians: f32) -> f32 {
    angle_to_degrees(radians_to_angle(radians))
}

/// Degrees to radians through the angle unit.
#[inline]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    angle_to_radians(degrees_to_angle(degrees))
}
