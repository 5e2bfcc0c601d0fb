//! Unit quaternion rotations.
//!
//! Components are stored `(x, y, z, w)` and kept unit length by every
//! setter. Matrices produced here follow the row-vector convention used by
//! [`Transform`]: `p' = p * M`.

use std::ops::{Mul, MulAssign};

use bytemuck::{Pod, Zeroable};

use crate::transform::Transform;
use crate::vector::{Vector3, Vector4};

/// Below this vector-part length an axis/angle readback is treated as identity.
const AXIS_EPSILON: f32 = 1e-5;
/// Cosine bound for the parallel / anti-parallel cases of [`Rotation::from_to`].
const PARALLEL_COS: f32 = 0.99999;
/// Below `1 - cos` slerp falls back to a linear blend.
const SLERP_LINEAR: f32 = 1e-5;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Rotation {
    q: [f32; 4],
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rotation {
    pub const IDENTITY: Self = Self { q: [0.0, 0.0, 0.0, 1.0] };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Builds from raw components and renormalises.
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        let mut r = Self { q: [x, y, z, w] };
        r.normalize();
        r
    }

    pub fn from_array(q: [f32; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }

    /// Rotation of `radians` about `axis` (the axis need not be unit length).
    pub fn from_axis_angle(axis: Vector3, radians: f32) -> Self {
        let mut r = Self::IDENTITY;
        r.set_axis_angle(axis, radians);
        r
    }

    /// Shortest rotation taking direction `from` onto direction `to`.
    pub fn from_to(from: Vector3, to: Vector3) -> Self {
        let mut r = Self::IDENTITY;
        r.set_from_to(from, to);
        r
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.q[0]
    }
    #[inline]
    pub fn y(&self) -> f32 {
        self.q[1]
    }
    #[inline]
    pub fn z(&self) -> f32 {
        self.q[2]
    }
    #[inline]
    pub fn w(&self) -> f32 {
        self.q[3]
    }

    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        self.q
    }

    #[inline]
    pub fn as_vector4(&self) -> Vector4 {
        Vector4::from_array(self.q)
    }

    pub fn set_value(&mut self, x: f32, y: f32, z: f32, w: f32) {
        self.q = [x, y, z, w];
        self.normalize();
    }

    pub fn set_axis_angle(&mut self, axis: Vector3, radians: f32) {
        let mut a = axis;
        a.normalize();
        let half = radians * 0.5;
        let s = half.sin();
        self.q = [a.x * s, a.y * s, a.z * s, half.cos()];
        // a zero axis leaves only w
        self.normalize();
    }

    /// Axis and angle (radians). Identity-like quaternions give `(+Z, 0)`.
    pub fn axis_angle(&self) -> (Vector3, f32) {
        let v = Vector3::new(self.q[0], self.q[1], self.q[2]);
        let len = v.length();
        if len > AXIS_EPSILON {
            let w = self.q[3].clamp(-1.0, 1.0);
            (v * (1.0 / len), 2.0 * w.acos())
        } else {
            (Vector3::Z, 0.0)
        }
    }

    pub fn set_from_to(&mut self, rotate_from: Vector3, rotate_to: Vector3) {
        let mut from = rotate_from;
        let mut to = rotate_to;
        from.normalize();
        to.normalize();
        let cost = from.dot(&to);

        if cost > PARALLEL_COS {
            *self = Self::IDENTITY;
            return;
        }
        if cost < -PARALLEL_COS {
            // Half turn about any axis perpendicular to `from`.
            let mut tmp = from.cross(&Vector3::X);
            if tmp.length() < AXIS_EPSILON {
                tmp = from.cross(&Vector3::Y);
            }
            tmp.normalize();
            self.set_value(tmp.x, tmp.y, tmp.z, 0.0);
            return;
        }

        let mut axis = rotate_from.cross(&rotate_to);
        axis.normalize();
        axis *= (0.5 * (1.0 - cost)).sqrt();
        self.q = [axis.x, axis.y, axis.z, (0.5 * (1.0 + cost)).sqrt()];
    }

    /// Squared length of the four components.
    #[inline]
    pub fn norm(&self) -> f32 {
        self.as_vector4().dot(&self.as_vector4())
    }

    /// Rescales to unit length. A zero quaternion becomes the identity.
    pub fn normalize(&mut self) {
        let n = self.norm();
        if n == 0.0 {
            log::debug!("normalising a zero quaternion, using identity");
            *self = Self::IDENTITY;
            return;
        }
        let d = 1.0 / n.sqrt();
        for c in &mut self.q {
            *c *= d;
        }
    }

    /// Conjugate scaled by `1 / norm`, so un-normalised input still inverts.
    pub fn invert(&mut self) {
        let inv_norm = 1.0 / self.norm();
        self.q[0] = -self.q[0] * inv_norm;
        self.q[1] = -self.q[1] * inv_norm;
        self.q[2] = -self.q[2] * inv_norm;
        self.q[3] *= inv_norm;
    }

    pub fn inverse(&self) -> Self {
        let mut r = *self;
        r.invert();
        r
    }

    /// Tolerance equality on the squared component distance.
    #[inline]
    pub fn equals(&self, other: &Rotation, tolerance: f32) -> bool {
        self.as_vector4().equals(&other.as_vector4(), tolerance)
    }

    /// Rotation block as a transform with zero translation.
    pub fn matrix(&self) -> Transform {
        let [x, y, z, w] = self.q;
        Transform::from_rows([
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y + z * w),
                2.0 * (z * x - y * w),
            ],
            [
                2.0 * (x * y - z * w),
                1.0 - 2.0 * (z * z + x * x),
                2.0 * (y * z + x * w),
            ],
            [
                2.0 * (z * x + y * w),
                2.0 * (y * z - x * w),
                1.0 - 2.0 * (y * y + x * x),
            ],
            [0.0, 0.0, 0.0],
        ])
    }

    /// Reads the rotation out of the 3×3 block of `m`.
    ///
    /// Picks the dominant diagonal entry and solves from it, or from the
    /// trace when the trace dominates, so no step divides by a small number.
    /// An all-zero matrix yields the identity.
    pub fn set_matrix(&mut self, m: &Transform) {
        if m.is_zero() {
            *self = Self::IDENTITY;
            return;
        }

        let i = if m[0][0] > m[1][1] {
            if m[0][0] > m[2][2] { 0 } else { 2 }
        } else if m[1][1] > m[2][2] {
            1
        } else {
            2
        };

        let trace = m[0][0] + m[1][1] + m[2][2];
        if trace > m[i][i] {
            let w = (trace + 1.0).sqrt() * 0.5;
            let f = 1.0 / (4.0 * w);
            self.q = [
                (m[1][2] - m[2][1]) * f,
                (m[2][0] - m[0][2]) * f,
                (m[0][1] - m[1][0]) * f,
                w,
            ];
        } else {
            let j = (i + 1) % 3;
            let k = (i + 2) % 3;
            let qi = (m[i][i] - m[j][j] - m[k][k] + 1.0).sqrt() * 0.5;
            let f = 1.0 / (4.0 * qi);
            self.q[i] = qi;
            self.q[j] = (m[i][j] + m[j][i]) * f;
            self.q[k] = (m[i][k] + m[k][i]) * f;
            self.q[3] = (m[j][k] - m[k][j]) * f;
        }
        self.normalize();
    }

    /// Rotates `src` as a row vector through [`Rotation::matrix`].
    pub fn mult_vec(&self, src: Vector3) -> Vector3 {
        self.matrix().transform_point(src)
    }

    /// Keeps the axis and multiplies the angle by `factor`.
    pub fn scale_angle(&mut self, factor: f32) {
        let (axis, radians) = self.axis_angle();
        self.set_axis_angle(axis, radians * factor);
    }

    /// Spherical interpolation along the shorter arc.
    ///
    /// The result is a weighted sum and is not renormalised; near-parallel
    /// inputs blend linearly.
    pub fn slerp(rot0: &Rotation, rot1: &Rotation, t: f32) -> Rotation {
        let mut cosom = rot0.as_vector4().dot(&rot1.as_vector4());
        let mut r1 = rot1.q;
        if cosom < 0.0 {
            cosom = -cosom;
            for c in &mut r1 {
                *c = -*c;
            }
        }

        let (scale0, scale1) = if 1.0 - cosom > SLERP_LINEAR {
            let omega = cosom.acos();
            let sinom = omega.sin();
            (((1.0 - t) * omega).sin() / sinom, (t * omega).sin() / sinom)
        } else {
            (1.0 - t, t)
        };

        let mut q = [0.0; 4];
        for (i, c) in q.iter_mut().enumerate() {
            *c = scale0 * rot0.q[i] + scale1 * r1[i];
        }
        Rotation { q }
    }
}

impl From<&Transform> for Rotation {
    fn from(m: &Transform) -> Self {
        let mut r = Rotation::IDENTITY;
        r.set_matrix(m);
        r
    }
}

impl From<Transform> for Rotation {
    fn from(m: Transform) -> Self {
        Rotation::from(&m)
    }
}

/// `a *= b` applies `a` first and then `b`, so `(a * b).matrix()` equals
/// `a.matrix() * b.matrix()` for row vectors. The result is renormalised.
impl MulAssign for Rotation {
    fn mul_assign(&mut self, q: Rotation) {
        let [x, y, z, w] = self.q;
        let [qx, qy, qz, qw] = q.q;
        self.q = [
            qw * x + qx * w + qy * z - qz * y,
            qw * y + qy * w + qz * x - qx * z,
            qw * z + qz * w + qx * y - qy * x,
            qw * w - qx * x - qy * y - qz * z,
        ];
        self.normalize();
    }
}

impl Mul for Rotation {
    type Output = Rotation;

    fn mul(mut self, q: Rotation) -> Rotation {
        self *= q;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use mathcore::scalar::{PI, PI_HALF};

    fn assert_rot_eq(a: Rotation, b: Rotation, eps: f32) {
        for i in 0..4 {
            assert_abs_diff_eq!(a.q[i], b.q[i], epsilon = eps);
        }
    }

    fn assert_vec_eq(a: Vector3, b: Vector3, eps: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = eps);
        assert_abs_diff_eq!(a.y, b.y, epsilon = eps);
        assert_abs_diff_eq!(a.z, b.z, epsilon = eps);
    }

    #[test]
    fn product_matches_known_value() {
        let mut r = Rotation::IDENTITY;
        r *= Rotation { q: [0.0, 1.0, 0.0, 0.035] };
        assert_rot_eq(r, Rotation { q: [0.0, 0.999_388_1, 0.0, 0.034_978_58] }, 1e-6);
    }

    #[test]
    fn product_with_inverse_is_identity() {
        let samples = [
            Rotation::new(0.3, -0.2, 0.9, 0.1),
            Rotation::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 1.3),
            Rotation::from_axis_angle(Vector3::Z, -2.9),
        ];
        for q in samples {
            assert!((q * q.inverse()).equals(&Rotation::IDENTITY, 1e-10));
        }
    }

    #[test]
    fn inverse_of_unnormalised_state_still_inverts() {
        let raw = Rotation { q: [0.0, 0.0, 2.0, 0.0] };
        let inv = raw.inverse();
        assert_rot_eq(inv, Rotation { q: [0.0, 0.0, -0.5, 0.0] }, 1e-7);
    }

    #[test]
    fn zero_quaternion_normalises_to_identity() {
        assert_eq!(Rotation::new(0.0, 0.0, 0.0, 0.0), Rotation::IDENTITY);
    }

    #[test]
    fn axis_angle_roundtrip_and_degenerate() {
        let r = Rotation::from_axis_angle(Vector3::new(0.0, 2.0, 0.0), 0.75);
        let (axis, angle) = r.axis_angle();
        assert_vec_eq(axis, Vector3::Y, 1e-6);
        assert_abs_diff_eq!(angle, 0.75, epsilon = 1e-5);

        let (axis, angle) = Rotation::IDENTITY.axis_angle();
        assert_eq!(axis, Vector3::Z);
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn from_to_handles_parallel_and_opposite() {
        assert_eq!(Rotation::from_to(Vector3::X, Vector3::X * 3.0), Rotation::IDENTITY);

        // Opposite along X: X cross X is zero, so the Y fallback is used.
        let r = Rotation::from_to(Vector3::X, -Vector3::X);
        assert_rot_eq(r, Rotation { q: [0.0, 0.0, 1.0, 0.0] }, 1e-6);
        assert_vec_eq(r.mult_vec(Vector3::X), -Vector3::X, 1e-6);

        let r = Rotation::from_to(Vector3::Y, -Vector3::Y);
        assert_vec_eq(r.mult_vec(Vector3::Y), -Vector3::Y, 1e-6);
    }

    #[test]
    fn zero_axis_stays_unit() {
        let r = Rotation::from_axis_angle(Vector3::ZERO, 1.0);
        assert_abs_diff_eq!(r.norm(), 1.0, epsilon = 1e-6);
        assert_rot_eq(r, Rotation::IDENTITY, 1e-6);

        let mut r = Rotation::from_axis_angle(Vector3::Z, 0.5);
        r.set_axis_angle(Vector3::ZERO, PI);
        assert_abs_diff_eq!(r.w().abs(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(r.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn axis_angle_readback_near_epsilon() {
        // vector part just under the limit reads back as identity
        let (axis, angle) = Rotation { q: [9e-6, 0.0, 0.0, 1.0] }.axis_angle();
        assert_eq!(axis, Vector3::Z);
        assert_eq!(angle, 0.0);

        let (axis, _) = Rotation { q: [2e-5, 0.0, 0.0, 1.0] }.axis_angle();
        assert_vec_eq(axis, Vector3::X, 1e-6);
    }

    #[test]
    fn from_to_near_parallel_thresholds() {
        // cos ~ 0.999992 collapses to identity
        let r = Rotation::from_to(Vector3::X, Vector3::new(1.0, 0.004, 0.0));
        assert_eq!(r, Rotation::IDENTITY);

        // cos ~ 0.9999875 is a real, small rotation about +Z
        let r = Rotation::from_to(Vector3::X, Vector3::new(1.0, 0.005, 0.0));
        assert!(r.z() > 0.002 && r.z() < 0.003, "{r:?}");

        // cos ~ -0.999992 takes the half-turn branch
        let r = Rotation::from_to(Vector3::X, Vector3::new(-1.0, 0.004, 0.0));
        assert_rot_eq(r, Rotation { q: [0.0, 0.0, 1.0, 0.0] }, 1e-6);
    }

    #[test]
    fn from_to_maps_direction() {
        let from = Vector3::new(1.0, 2.0, -0.5);
        let to = Vector3::new(-3.0, 0.5, 1.0);
        let r = Rotation::from_to(from, to);
        let mut expect = to;
        expect.normalize();
        let mut got = r.mult_vec(from);
        got.normalize();
        assert_vec_eq(got, expect, 1e-5);
    }

    #[test]
    fn matrix_roundtrip_covers_each_branch() {
        let samples = [
            Rotation::from_axis_angle(Vector3::X, 0.4),
            Rotation::from_axis_angle(Vector3::X, PI - 0.1),
            Rotation::from_axis_angle(Vector3::Y, PI - 0.1),
            Rotation::from_axis_angle(Vector3::Z, PI - 0.1),
            Rotation::new(0.5, 0.5, 0.5, 0.5),
        ];
        for q in samples {
            let back = Rotation::from(q.matrix());
            // q and -q are the same rotation
            let same = back.equals(&q, 1e-10) || back.equals(&Rotation { q: q.q.map(|c| -c) }, 1e-10);
            assert!(same, "{q:?} -> {back:?}");
        }
        assert_eq!(Rotation::from(Transform::zero()), Rotation::IDENTITY);
    }

    #[test]
    fn mult_vec_matches_matrix_transform() {
        let r = Rotation::from_axis_angle(Vector3::Z, PI_HALF);
        assert_vec_eq(r.mult_vec(Vector3::X), Vector3::Y, 1e-6);

        let q = Rotation::new(0.1, 0.7, -0.3, 0.6);
        let v = Vector3::new(0.3, -1.2, 2.0);
        let m = q.matrix();
        assert_vec_eq(q.mult_vec(v), m.transform_direction(v), 1e-6);
    }

    #[test]
    fn composition_applies_left_operand_first() {
        let a = Rotation::from_axis_angle(Vector3::Z, PI_HALF);
        let b = Rotation::from_axis_angle(Vector3::X, PI_HALF);
        let v = Vector3::X;
        // X -> Y under a, then Y -> Z under b
        assert_vec_eq((a * b).mult_vec(v), b.mult_vec(a.mult_vec(v)), 1e-6);
        assert_vec_eq((a * b).mult_vec(v), Vector3::Z, 1e-6);
    }

    #[test]
    fn slerp_endpoints_and_identical_inputs() {
        let a = Rotation::from_axis_angle(Vector3::Y, 0.2);
        let b = Rotation::from_axis_angle(Vector3::Y, 1.4);
        assert_rot_eq(Rotation::slerp(&a, &b, 0.0), a, 1e-6);
        assert_rot_eq(Rotation::slerp(&a, &b, 1.0), b, 1e-6);
        let mid = Rotation::slerp(&a, &b, 0.5);
        assert_rot_eq(mid, Rotation::from_axis_angle(Vector3::Y, 0.8), 1e-5);

        for t in [0.0, 0.3, 0.9] {
            assert_rot_eq(Rotation::slerp(&a, &a, t), a, 1e-6);
        }
    }

    #[test]
    fn slerp_takes_shorter_arc() {
        let a = Rotation::IDENTITY;
        let b = Rotation { q: [0.0, 0.0, 0.0, -1.0] };
        // -identity is the same rotation; blending stays at identity.
        assert_rot_eq(Rotation::slerp(&a, &b, 0.5), a, 1e-6);
    }

    #[test]
    fn slerp_returns_raw_weighted_sum() {
        // inputs are not renormalised and neither is the blend
        let raw = Rotation { q: [0.0, 0.0, 0.0, 2.0] };
        assert_rot_eq(Rotation::slerp(&raw, &raw, 0.3), raw, 1e-6);

        // 1 - cos below the linear limit blends component-wise
        let near = Rotation { q: [0.0, 0.0, 0.002, 0.999_998] };
        let mid = Rotation::slerp(&Rotation::IDENTITY, &near, 0.5);
        assert_rot_eq(mid, Rotation { q: [0.0, 0.0, 0.001, 0.999_999] }, 1e-7);
        assert!(mid.norm() < 1.0);
    }

    #[test]
    fn scale_angle_keeps_axis() {
        let mut r = Rotation::from_axis_angle(Vector3::new(1.0, 0.0, 1.0), 0.6);
        r.scale_angle(2.0);
        let (axis, angle) = r.axis_angle();
        let mut expect = Vector3::new(1.0, 0.0, 1.0);
        expect.normalize();
        assert_vec_eq(axis, expect, 1e-5);
        assert_abs_diff_eq!(angle, 1.2, epsilon = 1e-5);
    }
}
