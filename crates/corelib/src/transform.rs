use std::fmt;
use std::ops::{Index, IndexMut, Mul, MulAssign};

use bytemuck::{Pod, Zeroable};

use crate::vector::Vector3;

/// Below this ratio of determinant to its absolute-term sum the 3×3 block
/// is treated as singular by [`Transform::inverse`].
const INVERSE_PRECISION_LIMIT: f32 = 1.0e-15;

/// Affine transform stored as a 4×3 row-major block.
///
/// Rows 0..3 are the linear part, row 3 is the translation. The implied
/// fourth column is `[0, 0, 0, 1]`. Points are row vectors: `p' = p * M`,
/// so `a * b` applies `a` first.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Transform {
    m: [[f32; 3]; 4],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]],
    };

    pub const ZERO: Self = Self { m: [[0.0; 3]; 4] };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Twelve elements in row order, translation last.
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    #[inline]
    pub const fn new(
        a11: f32, a12: f32, a13: f32,
        a21: f32, a22: f32, a23: f32,
        a31: f32, a32: f32, a33: f32,
        a41: f32, a42: f32, a43: f32,
    ) -> Self {
        Self {
            m: [[a11, a12, a13], [a21, a22, a23], [a31, a32, a33], [a41, a42, a43]],
        }
    }

    #[inline]
    pub const fn from_rows(m: [[f32; 3]; 4]) -> Self {
        Self { m }
    }

    /// Takes the upper-left 4×3 of a row-vector 4×4; the last column is dropped.
    pub fn from_affine_4x4(m: &[[f32; 4]; 4]) -> Self {
        Self {
            m: [
                [m[0][0], m[0][1], m[0][2]],
                [m[1][0], m[1][1], m[1][2]],
                [m[2][0], m[2][1], m[2][2]],
                [m[3][0], m[3][1], m[3][2]],
            ],
        }
    }

    pub fn from_translation(t: Vector3) -> Self {
        let mut r = Self::IDENTITY;
        r.set_translation(t);
        r
    }

    /// Diagonal scale with zero translation.
    pub fn from_scale(s: Vector3) -> Self {
        Self::new(s.x, 0.0, 0.0, 0.0, s.y, 0.0, 0.0, 0.0, s.z, 0.0, 0.0, 0.0)
    }

    pub fn from_uniform_scale(s: f32) -> Self {
        Self::from_scale(Vector3::new(s, s, s))
    }

    #[inline]
    pub fn rows(&self) -> &[[f32; 3]; 4] {
        &self.m
    }

    pub fn make_identity(&mut self) {
        *self = Self::IDENTITY;
    }

    pub fn set_zero(&mut self) {
        *self = Self::ZERO;
    }

    /// Exact comparison against the identity.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// `true` if no element differs by more than `tolerance`.
    pub fn equals(&self, other: &Transform, tolerance: f32) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Determinant of the 3×3 formed from rows `r1`, `r2`, `r3`.
    pub fn det3(&self, r1: usize, r2: usize, r3: usize) -> f32 {
        let m = &self.m;
        m[r1][0] * m[r2][1] * m[r3][2]
            + m[r1][1] * m[r2][2] * m[r3][0]
            + m[r1][2] * m[r2][0] * m[r3][1]
            - m[r1][0] * m[r2][2] * m[r3][1]
            - m[r1][1] * m[r2][0] * m[r3][2]
            - m[r1][2] * m[r2][1] * m[r3][0]
    }

    /// Determinant of the linear block.
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.det3(0, 1, 2)
    }

    /// Affine inverse.
    ///
    /// When the linear block is singular (its determinant is negligible
    /// against the sum of its terms) the matrix is returned unchanged.
    pub fn inverse(&self) -> Transform {
        if self.is_identity() {
            return Self::IDENTITY;
        }

        let m = &self.m;
        let terms = [
            m[0][0] * m[1][1] * m[2][2],
            m[0][1] * m[1][2] * m[2][0],
            m[0][2] * m[1][0] * m[2][1],
            -(m[0][2] * m[1][1] * m[2][0]),
            -(m[0][1] * m[1][0] * m[2][2]),
            -(m[0][0] * m[1][2] * m[2][1]),
        ];
        let (mut pos, mut neg) = (0.0f32, 0.0f32);
        for t in terms {
            if t >= 0.0 {
                pos += t;
            } else {
                neg += t;
            }
        }
        let det = pos + neg;

        // An all-zero block gives 0/0; treat that as singular too.
        let ratio = det / (pos - neg);
        if ratio.is_nan() || ratio.abs() < INVERSE_PRECISION_LIMIT {
            log::debug!("inverse: singular linear block (det {det:e}), returning input");
            return *self;
        }

        let d = 1.0 / det;
        let mut r = [[0.0f32; 3]; 4];
        r[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * d;
        r[1][0] = -(m[1][0] * m[2][2] - m[1][2] * m[2][0]) * d;
        r[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * d;
        r[0][1] = -(m[0][1] * m[2][2] - m[0][2] * m[2][1]) * d;
        r[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * d;
        r[2][1] = -(m[0][0] * m[2][1] - m[0][1] * m[2][0]) * d;
        r[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * d;
        r[1][2] = -(m[0][0] * m[1][2] - m[0][2] * m[1][0]) * d;
        r[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * d;

        for j in 0..3 {
            r[3][j] = -(m[3][0] * r[0][j] + m[3][1] * r[1][j] + m[3][2] * r[2][j]);
        }
        Transform { m: r }
    }

    /// Transposes the linear block. The translation row comes back zero.
    #[rustfmt::skip]
    pub fn transpose(&self) -> Transform {
        let m = &self.m;
        Self::new(
            m[0][0], m[1][0], m[2][0],
            m[0][1], m[1][1], m[2][1],
            m[0][2], m[1][2], m[2][2],
            0.0, 0.0, 0.0,
        )
    }

    /// `self = self * m`.
    pub fn mul_right(&mut self, m: &Transform) {
        if m.is_identity() {
            return;
        }
        if self.is_identity() {
            *self = *m;
            return;
        }

        self.m = affine_product(&self.m, &m.m);
    }

    /// `self = m * self`.
    pub fn mul_left(&mut self, m: &Transform) {
        if m.is_identity() {
            return;
        }
        if self.is_identity() {
            *self = *m;
            return;
        }

        self.m = affine_product(&m.m, &self.m);
    }

    /// Row-vector point transform, translation included.
    pub fn transform_point(&self, src: Vector3) -> Vector3 {
        self.transform_direction(src) + self.translation()
    }

    /// Row-vector transform of a direction; translation is ignored.
    pub fn transform_direction(&self, src: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            src.x * m[0][0] + src.y * m[1][0] + src.z * m[2][0],
            src.x * m[0][1] + src.y * m[1][1] + src.z * m[2][1],
            src.x * m[0][2] + src.y * m[1][2] + src.z * m[2][2],
        )
    }

    /// Linear block times `src` as a column vector. For an orthonormal
    /// block this undoes [`transform_direction`](Self::transform_direction).
    pub fn mul_column_vector(&self, src: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            m[0][0] * src.x + m[0][1] * src.y + m[0][2] * src.z,
            m[1][0] * src.x + m[1][1] * src.y + m[1][2] * src.z,
            m[2][0] * src.x + m[2][1] * src.y + m[2][2] * src.z,
        )
    }

    #[inline]
    pub fn translation(&self) -> Vector3 {
        Vector3::from_array(self.m[3])
    }

    /// Replaces the translation row only.
    #[inline]
    pub fn set_translation(&mut self, t: Vector3) {
        self.m[3] = t.to_array();
    }

    /// Adds `t` to the translation row.
    pub fn apply_translation(&mut self, t: Vector3) {
        self.set_translation(self.translation() + t);
    }

    /// Per-axis scale, read as the length of each linear row.
    pub fn scale(&self) -> Vector3 {
        Vector3::new(
            Vector3::from_array(self.m[0]).length(),
            Vector3::from_array(self.m[1]).length(),
            Vector3::from_array(self.m[2]).length(),
        )
    }
}

/// `a * b` for two 4×3 affine blocks with the implied `[0, 0, 0, 1]` column.
fn affine_product(a: &[[f32; 3]; 4], b: &[[f32; 3]; 4]) -> [[f32; 3]; 4] {
    let mut out = [[0.0f32; 3]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            if i == 3 {
                *cell += b[3][j];
            }
        }
    }
    out
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<usize> for Transform {
    type Output = [f32; 3];

    #[inline]
    fn index(&self, row: usize) -> &[f32; 3] {
        &self.m[row]
    }
}

impl IndexMut<usize> for Transform {
    #[inline]
    fn index_mut(&mut self, row: usize) -> &mut [f32; 3] {
        &mut self.m[row]
    }
}

impl MulAssign<&Transform> for Transform {
    fn mul_assign(&mut self, rhs: &Transform) {
        self.mul_right(rhs);
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(mut self, rhs: Transform) -> Transform {
        self.mul_right(&rhs);
        self
    }
}

/// Five significant digits like C's `%.5g`: fixed notation for exponents
/// in `-4..5`, scientific otherwise, trailing zeros dropped.
fn general(v: f32) -> String {
    if v == 0.0 || !v.is_finite() {
        return v.to_string();
    }
    let exp = v.abs().log10().floor() as i32;
    if (-4..5).contains(&exp) {
        let decimals = (4 - exp) as usize;
        let s = format!("{v:.decimals$}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        let s = format!("{v:.4e}");
        match s.split_once('e') {
            Some((mantissa, e)) => {
                format!("{}e{e}", mantissa.trim_end_matches('0').trim_end_matches('.'))
            }
            None => s,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.m {
            let [a, b, c] = row.map(general);
            writeln!(f, "{a:>10}\t{b:>10}\t{c:>10}")?;
        }
        Ok(())
    }
}
