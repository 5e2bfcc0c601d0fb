//! Core types: vectors, quaternion rotations and the 4×3 affine Transform,
//! plus factoring/decomposition and glam interop.

pub use mathcore::{MathError, MathResult, angle, scalar};

pub mod decompose;
pub mod interop;
pub mod jacobi;
pub mod rotation;
pub mod transform;
pub mod vector;

pub use decompose::{Factorization, TrsDecomposition};
pub use jacobi::{SymmetricEigen, jacobi3};
pub use rotation::Rotation;
pub use transform::Transform;
pub use vector::{Vector2, Vector3, Vector4};
