//! Named scalar constants shared by the vector, rotation and transform types.

pub const ZERO: f32 = 0.0;
pub const ONE: f32 = 1.0;
pub const TWO: f32 = 2.0;
pub const HALF: f32 = 0.5;

pub const PI: f32 = std::f32::consts::PI;
pub const TWO_PI: f32 = std::f32::consts::TAU;
pub const PI_HALF: f32 = std::f32::consts::FRAC_PI_2;
pub const PI_FOURTH: f32 = std::f32::consts::FRAC_PI_4;

pub const EPSILON: f32 = 1.0e-7;
pub const MAX: f32 = 1.0e+38;
