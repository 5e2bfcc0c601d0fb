//! Conversions to and from `glam` for engine-side use.
//!
//! `glam` multiplies column vectors, so a row-vector [`Transform`] `M`
//! maps to `Mᵀ` and the matrix rows become glam columns.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::rotation::Rotation;
use crate::transform::Transform;
use crate::vector::{Vector2, Vector3, Vector4};

impl From<Vector2> for Vec2 {
    #[inline]
    fn from(v: Vector2) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec2> for Vector2 {
    #[inline]
    fn from(v: Vec2) -> Self {
        Vector2::new(v.x, v.y)
    }
}

impl From<Vector3> for Vec3 {
    #[inline]
    fn from(v: Vector3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Vector3 {
    #[inline]
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector4> for Vec4 {
    #[inline]
    fn from(v: Vector4) -> Self {
        Vec4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vec4> for Vector4 {
    #[inline]
    fn from(v: Vec4) -> Self {
        Vector4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Rotation> for Quat {
    #[inline]
    fn from(r: Rotation) -> Self {
        Quat::from_xyzw(r.x(), r.y(), r.z(), r.w())
    }
}

/// Renormalises on the way in.
impl From<Quat> for Rotation {
    #[inline]
    fn from(q: Quat) -> Self {
        Rotation::new(q.x, q.y, q.z, q.w)
    }
}

impl Transform {
    /// Column-major 4×4 for glam / GPU upload (`G = Mᵀ`).
    pub fn to_mat4(&self) -> Mat4 {
        let row = |i: usize| Vec3::from_array(self[i]);
        Mat4::from_cols(
            row(0).extend(0.0),
            row(1).extend(0.0),
            row(2).extend(0.0),
            row(3).extend(1.0),
        )
    }
}

impl From<Transform> for Mat4 {
    #[inline]
    fn from(t: Transform) -> Self {
        t.to_mat4()
    }
}

/// Drops the projective row of `m`.
impl From<Mat4> for Transform {
    fn from(m: Mat4) -> Self {
        Transform::from_rows([
            m.x_axis.truncate().to_array(),
            m.y_axis.truncate().to_array(),
            m.z_axis.truncate().to_array(),
            m.w_axis.truncate().to_array(),
        ])
    }
}
