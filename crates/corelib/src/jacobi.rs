//! Cyclic Jacobi diagonalisation of a symmetric 3×3 matrix.

use crate::vector::Vector3;

/// Sweep limit; a symmetric 3×3 normally converges in well under ten.
const MAX_SWEEPS: usize = 50;
/// During the first three sweeps only entries above `sm * EARLY_THRESHOLD`
/// are rotated (`0.2 / 9`).
const EARLY_THRESHOLD: f32 = 0.022_222_222;
/// An off-diagonal entry this many times smaller than both diagonal
/// neighbours is flushed to zero after the fourth sweep.
const DEFLATE_FACTOR: f32 = 100.0;

/// Eigen decomposition `A = V * diag(values) * Vᵗ`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymmetricEigen {
    pub values: [f32; 3],
    /// Rows of `V`. Column `j` (`vectors[i][j]` over `i`) is the
    /// eigenvector for `values[j]`.
    pub vectors: [Vector3; 3],
    /// Plane rotations actually applied.
    pub rotations: u32,
}

impl SymmetricEigen {
    /// Eigenvector `j` as a vector.
    pub fn eigenvector(&self, j: usize) -> Vector3 {
        Vector3::new(self.vectors[0][j], self.vectors[1][j], self.vectors[2][j])
    }
}

/// Applies the current plane rotation to the pair `(g, h)`.
#[inline]
fn rotate(g: f32, h: f32, s: f32, tau: f32) -> (f32, f32) {
    (g - s * (h + g * tau), h + s * (g - h * tau))
}

/// Diagonalises the symmetric matrix `m` (only the upper triangle is read
/// after the first copy). Works on local buffers; `m` is not modified.
pub fn jacobi3(m: &[[f32; 3]; 3]) -> SymmetricEigen {
    let mut a = *m;
    let mut d = [m[0][0], m[1][1], m[2][2]];
    let mut b = d;
    let mut z = [0.0f32; 3];
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let mut rotations = 0u32;

    let finish = |d: [f32; 3], v: [[f32; 3]; 3], rotations: u32| SymmetricEigen {
        values: d,
        vectors: v.map(Vector3::from_array),
        rotations,
    };

    for sweep in 0..MAX_SWEEPS {
        let sm = a[0][1].abs() + a[0][2].abs() + a[1][2].abs();
        if sm == 0.0 {
            log::trace!("jacobi3 converged after {sweep} sweeps, {rotations} rotations");
            return finish(d, v, rotations);
        }

        let thresh = if sweep < 3 { sm * EARLY_THRESHOLD } else { 0.0 };

        for p in 0..2 {
            for q in (p + 1)..3 {
                let g = DEFLATE_FACTOR * a[p][q].abs();

                if sweep > 3 && d[p].abs() + g == d[p].abs() && d[q].abs() + g == d[q].abs() {
                    a[p][q] = 0.0;
                } else if a[p][q].abs() > thresh {
                    let mut h = d[q] - d[p];
                    let t = if h.abs() + g == h.abs() {
                        a[p][q] / h
                    } else {
                        let theta = 0.5 * h / a[p][q];
                        let t = 1.0 / (theta.abs() + (1.0 + theta * theta).sqrt());
                        if theta < 0.0 { -t } else { t }
                    };

                    let c = 1.0 / (1.0 + t * t).sqrt();
                    let s = t * c;
                    let tau = s / (1.0 + c);
                    h = t * a[p][q];
                    z[p] -= h;
                    z[q] += h;
                    d[p] -= h;
                    d[q] += h;
                    a[p][q] = 0.0;

                    for j in 0..p {
                        (a[j][p], a[j][q]) = rotate(a[j][p], a[j][q], s, tau);
                    }
                    for j in (p + 1)..q {
                        (a[p][j], a[j][q]) = rotate(a[p][j], a[j][q], s, tau);
                    }
                    for j in (q + 1)..3 {
                        (a[p][j], a[q][j]) = rotate(a[p][j], a[q][j], s, tau);
                    }
                    for row in &mut v {
                        (row[p], row[q]) = rotate(row[p], row[q], s, tau);
                    }
                    rotations += 1;
                }
            }
        }

        for p in 0..3 {
            b[p] += z[p];
            d[p] = b[p];
            z[p] = 0.0;
        }
    }

    log::warn!("jacobi3 did not converge in {MAX_SWEEPS} sweeps ({rotations} rotations)");
    finish(d, v, rotations)
}
