//! Factoring and composing transforms.
//!
//! `factor` splits the linear block as `M = R * S * Rᵗ * U` plus a
//! translation. `set_transform` / `get_transform` convert between a
//! matrix and translation, rotation, scale and scale-orientation about a
//! pivot. The Euler helpers use fixed axes in degrees, applied Z then Y
//! then X.

use mathcore::angle::{degrees_to_radians, radians_to_degrees};
use mathcore::{MathError, MathResult};

use crate::jacobi::jacobi3;
use crate::rotation::Rotation;
use crate::transform::Transform;
use crate::vector::Vector3;

/// `|det|` below this is refused by [`Transform::factor`].
const FACTOR_SINGULAR_LIMIT: f32 = 1e-12;
/// `|row2.x - 1|` at or below this is handled as gimbal lock.
const GIMBAL_LIMIT: f32 = 0.001;

/// Result of [`Transform::factor`]: `M = r * diag(s) * rᵗ * u * T(t)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Factorization {
    /// Eigenvector frame of `A * Aᵗ`.
    pub r: Transform,
    /// Signed per-axis scale; negative when the linear block mirrors.
    pub s: Vector3,
    /// Orthonormal remainder.
    pub u: Transform,
    pub t: Vector3,
    /// Always identity; projective parts are not modelled.
    pub proj: Transform,
}

/// Translation, rotation, scale and scale orientation of a transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrsDecomposition {
    pub translation: Vector3,
    pub rotation: Rotation,
    pub scale: Vector3,
    pub scale_orientation: Rotation,
}

impl Default for TrsDecomposition {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            rotation: Rotation::IDENTITY,
            scale: Vector3::ONE,
            scale_orientation: Rotation::IDENTITY,
        }
    }
}

impl TrsDecomposition {
    pub fn new(translation: Vector3, rotation: Rotation, scale: Vector3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            scale_orientation: Rotation::IDENTITY,
        }
    }
}

/// Fixed-axis rotation about Z, Y or X as a row-vector matrix.
fn axis_rotation(axis: usize, degrees: f32) -> Transform {
    let (s, c) = degrees_to_radians(degrees).sin_cos();
    match axis {
        0 => Transform::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c, 0.0, 0.0, 0.0),
        1 => Transform::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c, 0.0, 0.0, 0.0),
        _ => Transform::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0),
    }
}

impl Transform {
    /// Rotation block of `r` with zero translation.
    pub fn from_rotation(r: &Rotation) -> Self {
        r.matrix()
    }

    /// Scale, then Euler rotation in degrees, then translation.
    pub fn from_trs(translation: Vector3, rotation_degrees: Vector3, scale: Vector3) -> Self {
        let mut t = Self::IDENTITY;
        t.set_transform_euler(translation, rotation_degrees, scale);
        t
    }

    /// Quaternion read from the linear block.
    pub fn rotation(&self) -> Rotation {
        Rotation::from(self)
    }

    /// Factors the matrix into `r * diag(s) * rᵗ * u` and a translation.
    ///
    /// Fails with [`MathError::SingularMatrix`] when the linear block has
    /// (nearly) zero determinant; no partial output is returned then.
    pub fn factor(&self) -> MathResult<Factorization> {
        let mut a = *self;
        let t = a.translation();
        a.set_translation(Vector3::ZERO);

        let det = a.determinant();
        let det_sign = if det < 0.0 { -1.0 } else { 1.0 };
        if det_sign * det < FACTOR_SINGULAR_LIMIT {
            log::debug!("factor: singular matrix, det {det:e}");
            return Err(MathError::SingularMatrix { determinant: det });
        }

        let b = a * a.transpose();
        let eigen = jacobi3(&[b[0], b[1], b[2]]);

        let v = eigen.vectors;
        let r = Transform::from_rows([v[0].to_array(), v[1].to_array(), v[2].to_array(), [0.0; 3]]);

        let mut s = Vector3::ZERO;
        let mut si = Transform::IDENTITY;
        for i in 0..3 {
            s[i] = det_sign * eigen.values[i].sqrt();
            si[i][i] = 1.0 / s[i];
        }

        let u = r * si * r.transpose() * a;

        Ok(Factorization {
            r,
            s,
            u,
            t,
            proj: Transform::IDENTITY,
        })
    }

    /// Composes from `trs` about the pivot `center`:
    /// `T(-c) * SOᵗ * S * SO * R * T(c) * T(t)`. Identity parts are skipped.
    pub fn set_transform(&mut self, trs: &TrsDecomposition, center: Vector3) {
        self.make_identity();

        if !trs.translation.is_zero() {
            self.mul_left(&Transform::from_translation(trs.translation));
        }
        if !center.is_zero() {
            self.mul_left(&Transform::from_translation(center));
        }
        if trs.rotation != Rotation::IDENTITY {
            self.mul_left(&trs.rotation.matrix());
        }
        if trs.scale != Vector3::ONE {
            let so = trs.scale_orientation;
            let oriented = so != Rotation::IDENTITY;
            if oriented {
                self.mul_left(&so.matrix());
            }
            self.mul_left(&Transform::from_scale(trs.scale));
            if oriented {
                self.mul_left(&so.inverse().matrix());
            }
        }
        if !center.is_zero() {
            self.mul_left(&Transform::from_translation(-center));
        }
    }

    /// Inverse of [`set_transform`](Self::set_transform) for the same pivot.
    pub fn get_transform(&self, center: Vector3) -> MathResult<TrsDecomposition> {
        let f = if center.is_zero() {
            self.factor()?
        } else {
            // Factor [c] * [self] * [-c] so that [-c] * m * [c] == self.
            let mut m = Transform::from_translation(-center);
            m.mul_left(self);
            m.mul_left(&Transform::from_translation(center));
            m.factor()?
        };

        Ok(TrsDecomposition {
            translation: f.t,
            rotation: Rotation::from(&f.u),
            scale: f.s,
            // factor yields the transposed scale orientation
            scale_orientation: Rotation::from(f.r.transpose()),
        })
    }

    /// Fixed-axis X, Y, Z angles in degrees, each in `[0, 360)`.
    ///
    /// Rows are normalised first so scale does not leak into the angles.
    /// Near `Y = 90` the Z freedom is lost and folded into X.
    pub fn euler_degrees(&self) -> Vector3 {
        let mut t = [[0.0f32; 3]; 3];
        for (i, row) in t.iter_mut().enumerate() {
            let mut v = Vector3::from_array(self[i]);
            v.normalize();
            *row = v.to_array();
        }

        let mut r = Vector3::ZERO;
        r.y = radians_to_degrees(t[2][0].clamp(-1.0, 1.0).asin());
        if (t[2][0] - 1.0).abs() > GIMBAL_LIMIT {
            r.x = radians_to_degrees((-t[2][1]).atan2(t[2][2]));
            r.z = radians_to_degrees((-t[1][0]).atan2(t[0][0]));
        } else {
            r.x = radians_to_degrees(t[0][1].atan2(t[2][1]));
            r.z = 0.0;
        }

        for i in 0..3 {
            if r[i] < 0.0 {
                r[i] += 360.0;
            }
        }
        r
    }

    /// `self = self * rotation`.
    pub fn apply_rotation(&mut self, rotation: &Rotation) {
        self.mul_right(&rotation.matrix());
    }

    /// Right-multiplies fixed-axis rotations in Z, Y, X order; zero angles
    /// are skipped.
    pub fn apply_rotation_euler(&mut self, degrees: Vector3) {
        for axis in [2, 1, 0] {
            if degrees[axis] != 0.0 {
                self.mul_right(&axis_rotation(axis, degrees[axis]));
            }
        }
    }

    /// Scale, Euler rotation (degrees), then translation.
    pub fn set_transform_euler(&mut self, translation: Vector3, degrees: Vector3, scale: Vector3) {
        *self = Transform::from_scale(scale);
        self.apply_rotation_euler(degrees);
        self.set_translation(translation);
    }

    /// [`set_transform_euler`](Self::set_transform_euler) with `scale * uniform`.
    pub fn set_transform_euler_scaled(
        &mut self,
        translation: Vector3,
        degrees: Vector3,
        scale: Vector3,
        uniform: f32,
    ) {
        self.set_transform_euler(translation, degrees, scale * uniform);
    }

    /// Replaces the rotation, keeping translation and row-length scale.
    pub fn set_rotation_only(&mut self, rotation: Rotation) {
        let trs = TrsDecomposition::new(self.translation(), rotation, self.scale());
        self.set_transform(&trs, Vector3::ZERO);
    }

    pub fn set_rotation_only_euler(&mut self, degrees: Vector3) {
        let (t, s) = (self.translation(), self.scale());
        self.set_transform_euler(t, degrees, s);
    }

    /// Replaces the scale, keeping translation and the Euler rotation.
    pub fn set_scale_only(&mut self, scale: Vector3) {
        let (t, r) = (self.translation(), self.euler_degrees());
        self.set_transform_euler(t, r, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Transform {
        Transform::new(6.0, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0, 0.0, 0.0, 0.0)
    }

    fn assert_vec_eq(a: Vector3, b: Vector3, eps: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = eps);
        assert_abs_diff_eq!(a.y, b.y, epsilon = eps);
        assert_abs_diff_eq!(a.z, b.z, epsilon = eps);
    }

    fn assert_row(t: &Transform, i: usize, expect: [f32; 3]) {
        for j in 0..3 {
            assert_abs_diff_eq!(t[i][j], expect[j], epsilon = 2e-5);
        }
    }

    fn same_rotation(a: &Rotation, b: &Rotation, tol: f32) -> bool {
        let neg = Rotation::from_array([-b.x(), -b.y(), -b.z(), -b.w()]);
        a.equals(b, tol) || a.equals(&neg, tol)
    }

    #[test]
    fn factor_identity() {
        let f = Transform::IDENTITY.factor().unwrap();
        assert_eq!(f.r, Transform::IDENTITY);
        assert_eq!(f.u, Transform::IDENTITY);
        assert_eq!(f.s, Vector3::ONE);
        assert_eq!(f.t, Vector3::ZERO);
        assert_eq!(f.proj, Transform::IDENTITY);
    }

    #[test]
    fn factor_rejects_singular() {
        let t = Transform::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let err = t.factor().unwrap_err();
        assert_eq!(err, MathError::SingularMatrix { determinant: 0.0 });
        assert!(Transform::ZERO.factor().is_err());
    }

    #[test]
    fn factor_singular_limit_applies_to_abs_det() {
        // det 1e-13 on either side of zero is refused
        assert!(Transform::from_scale(Vector3::new(1e-3, 1e-3, 1e-7)).factor().is_err());
        assert!(Transform::from_scale(Vector3::new(1e-3, 1e-3, -1e-7)).factor().is_err());

        // det 1e-11 is small but still factors
        let f = Transform::from_scale(Vector3::new(1e-3, 1e-3, 1e-5)).factor().unwrap();
        assert_abs_diff_eq!(f.s.x, 1e-3, epsilon = 1e-8);
        assert_abs_diff_eq!(f.s.y, 1e-3, epsilon = 1e-8);
        assert_abs_diff_eq!(f.s.z, 1e-5, epsilon = 1e-10);
    }

    #[test]
    fn factor_reassembles_general_matrix() {
        let mut m = sample();
        m.set_translation(Vector3::new(1.0, -2.0, 3.0));
        let f = m.factor().unwrap();

        // det < 0: scales carry the sign
        assert!(f.s.x < 0.0 && f.s.y < 0.0 && f.s.z < 0.0);

        let rebuilt = f.r * Transform::from_scale(f.s) * f.r.transpose() * f.u
            * Transform::from_translation(f.t);
        assert!(rebuilt.equals(&m, 1e-3), "\n{rebuilt}vs\n{m}");

        // u is orthonormal
        let uu = f.u * f.u.transpose();
        assert!(uu.equals(&Transform::IDENTITY, 1e-5));
    }

    #[test]
    fn trs_roundtrip() {
        let trs = TrsDecomposition::new(
            Vector3::new(1.0, 2.0, 3.0),
            Rotation::from_axis_angle(Vector3::new(1.0, 2.0, -1.0), 0.7),
            Vector3::new(2.0, 3.0, 4.0),
        );
        let mut m = Transform::IDENTITY;
        m.set_transform(&trs, Vector3::ZERO);

        let back = m.get_transform(Vector3::ZERO).unwrap();
        assert_vec_eq(back.translation, trs.translation, 1e-5);
        assert_vec_eq(back.scale, trs.scale, 1e-4);
        assert!(same_rotation(&back.rotation, &trs.rotation, 1e-9));
    }

    #[test]
    fn trs_roundtrip_about_center() {
        let center = Vector3::new(0.5, -1.0, 2.0);
        let trs = TrsDecomposition::new(
            Vector3::new(-4.0, 0.0, 1.0),
            Rotation::from_axis_angle(Vector3::Y, 1.1),
            Vector3::new(1.0, 2.0, 3.0),
        );
        let mut m = Transform::IDENTITY;
        m.set_transform(&trs, center);

        // the pivot is a fixed point of rotation and scale
        let p = m.transform_point(center);
        assert_vec_eq(p, center + trs.translation, 1e-5);

        let back = m.get_transform(center).unwrap();
        assert_vec_eq(back.translation, trs.translation, 1e-4);
        assert_vec_eq(back.scale, trs.scale, 1e-4);
        assert!(same_rotation(&back.rotation, &trs.rotation, 1e-9));
    }

    #[test]
    fn scale_orientation_composes_around_frame() {
        let so = Rotation::from_axis_angle(Vector3::Z, 0.4);
        let trs = TrsDecomposition {
            scale_orientation: so,
            ..TrsDecomposition::new(Vector3::ZERO, Rotation::IDENTITY, Vector3::new(1.0, 3.0, 1.0))
        };
        let mut m = Transform::IDENTITY;
        m.set_transform(&trs, Vector3::ZERO);

        let expect = so.inverse().matrix() * Transform::from_scale(trs.scale) * so.matrix();
        assert!(m.equals(&expect, 1e-6));
        // a symmetric stretch has a symmetric block
        assert_abs_diff_eq!(m[0][1], m[1][0], epsilon = 1e-6);
    }

    #[test]
    fn set_rotation_only_euler_known_matrix() {
        let mut t = Transform::IDENTITY;
        t.set_rotation_only_euler(Vector3::new(10.0, 10.0, 10.0));

        assert_row(&t, 0, [0.969_846_25, 0.200_705_66, -0.138_258_35]);
        assert_row(&t, 1, [-0.171_010_08, 0.964_610_1, 0.200_705_68]);
        assert_row(&t, 2, [0.173_648_19, -0.171_010_08, 0.969_846_25]);
        assert_eq!(t.translation(), Vector3::ZERO);
        assert_vec_eq(t.scale(), Vector3::ONE, 1e-6);
        assert_vec_eq(t.euler_degrees(), Vector3::new(10.0, 10.0, 10.0), 1e-3);
    }

    #[test]
    fn set_scale_only_known_matrix() {
        let mut t = sample();
        t.set_scale_only(Vector3::new(2.0, 4.0, 8.0));

        assert_row(&t, 0, [1.676_008_8, -0.925_301_97, 0.578_628_06]);
        assert_row(&t, 1, [2.053_525_7, 1.955_282_7, -2.821_329_6]);
        assert_row(&t, 2, [1.479_200_5, 5.916_801_5, 5.177_202_7]);
        assert_row(&t, 3, [0.0, 0.0, 0.0]);
        assert_vec_eq(t.scale(), Vector3::new(2.0, 4.0, 8.0), 1e-5);
    }

    #[test]
    fn set_rotation_only_keeps_translation_and_scale() {
        let mut t = Transform::from_trs(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(30.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        );
        let r = Rotation::from_axis_angle(Vector3::Z, 0.3);
        t.set_rotation_only(r);

        assert_vec_eq(t.translation(), Vector3::new(1.0, 2.0, 3.0), 1e-5);
        assert_vec_eq(t.scale(), Vector3::new(2.0, 2.0, 2.0), 1e-5);
        // the block is scaled, so read the rotation through the factorisation
        let back = t.get_transform(Vector3::ZERO).unwrap();
        assert!(same_rotation(&back.rotation, &r, 1e-9));
        assert!(same_rotation(&(t * Transform::from_uniform_scale(0.5)).rotation(), &r, 1e-9));
    }

    #[test]
    fn euler_gimbal_lock_folds_into_x() {
        let t = Transform::from_trs(Vector3::ZERO, Vector3::new(0.0, 90.0, 0.0), Vector3::ONE);
        let e = t.euler_degrees();
        assert_abs_diff_eq!(e.y, 90.0, epsilon = 1e-3);
        assert_eq!(e.z, 0.0);
        let x = if e.x > 180.0 { e.x - 360.0 } else { e.x };
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn euler_angles_are_non_negative() {
        let t = Transform::from_trs(Vector3::ZERO, Vector3::new(-20.0, 0.0, -45.0), Vector3::ONE);
        let e = t.euler_degrees();
        assert_vec_eq(e, Vector3::new(340.0, 0.0, 315.0), 1e-3);
    }

    #[test]
    fn apply_rotation_euler_skips_zero_axes() {
        let mut t = Transform::from_scale(Vector3::new(1.0, 2.0, 3.0));
        let before = t;
        t.apply_rotation_euler(Vector3::ZERO);
        assert_eq!(t, before);

        let mut z = Transform::IDENTITY;
        z.apply_rotation_euler(Vector3::new(0.0, 0.0, 90.0));
        assert_vec_eq(z.transform_direction(Vector3::X), Vector3::Y, 1e-6);
    }

    #[test]
    fn quaternion_and_euler_rotations_agree() {
        let mut a = Transform::IDENTITY;
        a.apply_rotation_euler(Vector3::new(0.0, 35.0, 0.0));
        let mut b = Transform::IDENTITY;
        b.apply_rotation(&Rotation::from_axis_angle(Vector3::Y, degrees_to_radians(35.0)));
        assert!(a.equals(&b, 1e-6));
    }

    #[test]
    fn scaled_euler_multiplies_uniform() {
        let mut t = Transform::IDENTITY;
        t.set_transform_euler_scaled(Vector3::ZERO, Vector3::ZERO, Vector3::new(1.0, 2.0, 3.0), 2.0);
        assert_eq!(t.scale(), Vector3::new(2.0, 4.0, 6.0));
    }
}
