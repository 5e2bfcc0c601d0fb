//! Fixed-size float vectors (2, 3 and 4 components).
//!
//! In-place mutators (`normalize`, `negate`, `scale_to`, the `*Assign`
//! operators) change the receiver; the binary operators and `interpolate`
//! return a fresh value.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};

/// Component-wise arithmetic shared by every vector width.
macro_rules! impl_vector_ops {
    ($ty:ident, $n:literal, $($field:ident),+) => {
        impl $ty {
            pub const ZERO: Self = Self { $($field: 0.0),+ };

            #[inline]
            pub const fn from_array(v: [f32; $n]) -> Self {
                let [$($field),+] = v;
                Self { $($field),+ }
            }

            #[inline]
            pub const fn to_array(self) -> [f32; $n] {
                [$(self.$field),+]
            }

            /// `true` if every component is exactly zero.
            #[inline]
            pub fn is_zero(&self) -> bool {
                *self == Self::ZERO
            }

            #[inline]
            pub fn dot(&self, other: &Self) -> f32 {
                0.0 $(+ self.$field * other.$field)+
            }

            #[inline]
            pub fn length(&self) -> f32 {
                self.dot(self).sqrt()
            }

            /// Rescales to unit length and returns the prior length.
            /// A zero vector is left untouched and `0.0` is returned.
            pub fn normalize(&mut self) -> f32 {
                if self.is_zero() {
                    return 0.0;
                }
                let len = self.length();
                if len != 0.0 {
                    *self *= 1.0 / len;
                } else {
                    *self = Self::ZERO;
                }
                len
            }

            #[inline]
            pub fn negate(&mut self) {
                $(self.$field = -self.$field;)+
            }

            /// Tolerance equality. `tolerance` bounds the *squared* distance.
            #[inline]
            pub fn equals(&self, other: &Self, tolerance: f32) -> bool {
                let diff = *self - *other;
                diff.dot(&diff) <= tolerance
            }

            /// Linear blend: `v0` at `weight == 0`, `v1` at `weight == 1`.
            #[inline]
            pub fn interpolate(weight: f32, v0: &Self, v1: &Self) -> Self {
                *v0 * (1.0 - weight) + *v1 * weight
            }
        }

        impl From<[f32; $n]> for $ty {
            #[inline]
            fn from(v: [f32; $n]) -> Self {
                Self::from_array(v)
            }
        }

        impl From<$ty> for [f32; $n] {
            #[inline]
            fn from(v: $ty) -> Self {
                v.to_array()
            }
        }

        impl Index<usize> for $ty {
            type Output = f32;

            #[inline]
            fn index(&self, i: usize) -> &f32 {
                &bytemuck::cast_ref::<Self, [f32; $n]>(self)[i]
            }
        }

        impl IndexMut<usize> for $ty {
            #[inline]
            fn index_mut(&mut self, i: usize) -> &mut f32 {
                &mut bytemuck::cast_mut::<Self, [f32; $n]>(self)[i]
            }
        }

        impl Add for $ty {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $ty {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Neg for $ty {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }

        impl Mul<f32> for $ty {
            type Output = Self;
            #[inline]
            fn mul(self, d: f32) -> Self {
                Self { $($field: self.$field * d),+ }
            }
        }

        impl Mul<$ty> for f32 {
            type Output = $ty;
            #[inline]
            fn mul(self, v: $ty) -> $ty {
                v * self
            }
        }

        // Division multiplies by the reciprocal.
        impl Div<f32> for $ty {
            type Output = Self;
            #[inline]
            fn div(self, d: f32) -> Self {
                self * (1.0 / d)
            }
        }

        impl AddAssign for $ty {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                $(self.$field += rhs.$field;)+
            }
        }

        impl SubAssign for $ty {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$field -= rhs.$field;)+
            }
        }

        impl MulAssign<f32> for $ty {
            #[inline]
            fn mul_assign(&mut self, d: f32) {
                $(self.$field *= d;)+
            }
        }

        impl DivAssign<f32> for $ty {
            #[inline]
            fn div_assign(&mut self, d: f32) {
                *self *= 1.0 / d;
            }
        }
    };
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Homogeneous or general 4-tuple. Also backs rotation tolerance checks.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl_vector_ops!(Vector2, 2, x, y);
impl_vector_ops!(Vector3, 3, x, y, z);
impl_vector_ops!(Vector4, 4, x, y, z, w);

impl Vector2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn set(&mut self, x: f32, y: f32) {
        *self = Self::new(x, y);
    }
}

impl Vector3 {
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn set(&mut self, x: f32, y: f32, z: f32) {
        *self = Self::new(x, y, z);
    }

    /// Convex combination `v0 * b.x + v1 * b.y + v2 * b.z`.
    #[inline]
    pub fn from_barycentric(barycentric: &Vector3, v0: &Vector3, v1: &Vector3, v2: &Vector3) -> Self {
        *v0 * barycentric.x + *v1 * barycentric.y + *v2 * barycentric.z
    }

    /// In-place form of [`Vector3::from_barycentric`].
    #[inline]
    pub fn set_barycentric(&mut self, barycentric: &Vector3, v0: &Vector3, v1: &Vector3, v2: &Vector3) {
        *self = Self::from_barycentric(barycentric, v0, v1, v2);
    }

    /// Right-handed cross product.
    #[inline]
    pub fn cross(&self, v: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    /// Order-independent length estimate (max error about 7.7%):
    /// `15/16 * a + 3/8 * (b + c)` with `a` the largest magnitude.
    pub fn approximate_length(&self) -> f32 {
        let mut a = self.x.abs();
        let mut b = self.y.abs();
        let mut c = self.z.abs();

        if a < b {
            std::mem::swap(&mut a, &mut b);
        }
        if a < c {
            std::mem::swap(&mut a, &mut c);
        }

        a * 0.9375 + (b + c) * 0.375
    }

    /// Like [`normalize`](Self::normalize) but divides by the approximate length.
    pub fn approximate_normalize(&mut self) -> f32 {
        let len = self.approximate_length();
        if len != 0.0 {
            *self /= len;
        }
        len
    }

    /// Rescales to length `new_scale`; zero vectors are left alone.
    pub fn scale_to(&mut self, new_scale: f32) {
        let old = self.length();
        if old != 0.0 {
            *self *= new_scale / old;
        }
    }

    /// Signed principal axis with the largest dot product.
    /// Ties go to the first axis in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn closest_axis(&self) -> Vector3 {
        const CANDIDATES: [Vector3; 6] = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, -1.0),
        ];

        let mut best = CANDIDATES[0];
        // the best dot is never negative, so any seed below zero behaves the same
        let mut max = f32::NEG_INFINITY;
        for axis in CANDIDATES {
            let d = self.dot(&axis);
            if d > max {
                max = d;
                best = axis;
            }
        }
        best
    }
}

impl Vector4 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    #[inline]
    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) {
        *self = Self::new(x, y, z, w);
    }

    /// Dehomogenise: `xyz / w`.
    #[inline]
    pub fn real(&self) -> Vector3 {
        Vector3::new(self.x / self.w, self.y / self.w, self.z / self.w)
    }
}
