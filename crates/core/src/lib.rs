//! Core shared types and errors (engine-agnostic): scalar constants,
//! angle-unit conversions and the error type used by the math kernel.

use thiserror::Error;

pub mod angle;
pub mod scalar;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MathError {
    /// The upper-left 3x3 block is (numerically) singular and cannot be factored.
    #[error("singular matrix: determinant {determinant:e} is below the factoring limit")]
    SingularMatrix { determinant: f32 },
}

pub type MathResult<T> = Result<T, MathError>;
