//! Real matrix container with explicit shape metadata
//!
//! A thin row-major storage type for the real-valued expanded channel
//! matrix and the factors derived from it. Accessors are bounds-checked;
//! the shape travels with the data so callers never index blind.
//!
//! ## Example
//!
//! ```rust
//! use mls_core::matrix::RealMatrix;
//!
//! let m = RealMatrix::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(m.get(1, 0), 3.0);
//! assert_eq!(m.mat_vec(&[1.0, 1.0]), vec![3.0, 7.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{DetResult, DetectorError, Real};

/// Row-major real matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealMatrix {
    data: Vec<Real>,
    rows: usize,
    cols: usize,
}

impl RealMatrix {
    /// Wrap existing row-major data, checking the shape.
    pub fn new(rows: usize, cols: usize, data: Vec<Real>) -> DetResult<Self> {
        if data.len() != rows * cols {
            return Err(DetectorError::DimensionMismatch {
                what: "matrix data",
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// All-zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at `(r, c)`. Panics on out-of-range indices.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> Real {
        assert!(r < self.rows && c < self.cols, "index ({r}, {c}) out of range");
        self.data[r * self.cols + c]
    }

    /// Set element at `(r, c)`. Panics on out-of-range indices.
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, val: Real) {
        assert!(r < self.rows && c < self.cols, "index ({r}, {c}) out of range");
        self.data[r * self.cols + c] = val;
    }

    /// Copy of column `c`.
    pub fn column(&self, c: usize) -> Vec<Real> {
        (0..self.rows).map(|r| self.get(r, c)).collect()
    }

    /// `self * v`.
    pub fn mat_vec(&self, v: &[Real]) -> Vec<Real> {
        assert_eq!(self.cols, v.len(), "mat_vec length mismatch");
        let mut out = vec![0.0; self.rows];
        for r in 0..self.rows {
            let row = &self.data[r * self.cols..(r + 1) * self.cols];
            out[r] = row.iter().zip(v).map(|(&a, &b)| a * b).sum();
        }
        out
    }

    /// `self^T * v`.
    pub fn transpose_mat_vec(&self, v: &[Real]) -> Vec<Real> {
        assert_eq!(self.rows, v.len(), "transpose_mat_vec length mismatch");
        let mut out = vec![0.0; self.cols];
        for r in 0..self.rows {
            let row = &self.data[r * self.cols..(r + 1) * self.cols];
            for (o, &a) in out.iter_mut().zip(row) {
                *o += a * v[r];
            }
        }
        out
    }

    /// `self^T * self`, a `cols x cols` Gram matrix.
    pub fn gram(&self) -> RealMatrix {
        let n = self.cols;
        let mut out = Self::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let mut sum = 0.0;
                for r in 0..self.rows {
                    sum += self.get(r, i) * self.get(r, j);
                }
                out.set(i, j, sum);
                out.set(j, i, sum);
            }
        }
        out
    }
}

/// Solve `A x = b` for symmetric positive-definite `A` via Cholesky.
///
/// Non-positive pivots (a rank-deficient system) are clamped to a small
/// floor instead of failing; the solution is then only approximate, which
/// is the tolerated numerical-degeneracy behavior of the core.
pub fn cholesky_solve(a: &RealMatrix, b: &[Real]) -> Vec<Real> {
    let n = a.rows();
    assert_eq!(a.cols(), n, "cholesky_solve needs a square matrix");
    assert_eq!(b.len(), n, "cholesky_solve rhs length mismatch");

    // Lower-triangular factor, row-major.
    let mut l = vec![0.0 as Real; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a.get(i, j);
            for k in 0..j {
                sum -= l[i * n + k] * l[j * n + k];
            }
            if i == j {
                l[i * n + j] = sum.max(1e-30).sqrt();
            } else {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }

    // Forward then back substitution.
    let mut y = vec![0.0 as Real; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i * n + k] * y[k];
        }
        y[i] = sum / l[i * n + i];
    }
    let mut x = vec![0.0 as Real; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[k * n + i] * x[k];
        }
        x[i] = sum / l[i * n + i];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_checked_construction() {
        assert!(RealMatrix::new(2, 3, vec![0.0; 6]).is_ok());
        assert!(RealMatrix::new(2, 3, vec![0.0; 5]).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let m = RealMatrix::zeros(2, 2);
        let _ = m.get(2, 0);
    }

    #[test]
    fn test_mat_vec_and_transpose() {
        let m = RealMatrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.mat_vec(&[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
        assert_eq!(m.transpose_mat_vec(&[1.0, 1.0]), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_gram_is_symmetric() {
        let m = RealMatrix::new(3, 2, vec![1.0, 2.0, 0.5, -1.0, 2.0, 0.0]).unwrap();
        let g = m.gram();
        assert_eq!(g.rows(), 2);
        assert!((g.get(0, 1) - g.get(1, 0)).abs() < 1e-15);
    }

    #[test]
    fn test_cholesky_solve_recovers_solution() {
        // A = M^T M + I is SPD.
        let m = RealMatrix::new(3, 3, vec![2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]).unwrap();
        let mut a = m.gram();
        for i in 0..3 {
            a.set(i, i, a.get(i, i) + 1.0);
        }
        let x_true = vec![1.0, -2.0, 0.5];
        let b = a.mat_vec(&x_true);
        let x = cholesky_solve(&a, &b);
        for (xi, ti) in x.iter().zip(&x_true) {
            assert!((xi - ti).abs() < 1e-10);
        }
    }
}
