//! Lattice preprocessing — QR triangularization
//!
//! Rewrites the least-squares metric `||y - Hx||^2` into the equivalent
//! (up to a constant independent of `x`) triangular form `||z - Rx||^2`
//! with `R` upper-triangular and `z = Q^T y`. The triangular structure is
//! what lets the tree searches fix one symbol dimension at a time, last
//! dimension first, with a running partial metric.
//!
//! Uses real modified Gram-Schmidt. A rank-deficient channel produces a
//! (near-)zero pivot; the corresponding column of `Q` is left at zero and
//! the search proceeds with degraded metric quality. That is deliberate:
//! degeneracy is a channel condition the simulator measures, not an
//! error.

use crate::matrix::RealMatrix;
use crate::types::Real;

/// Triangularized system for one detection call.
///
/// Owned exclusively by the search routine that built it; dropped when
/// the call returns.
#[derive(Debug, Clone)]
pub struct TriangularModel {
    /// Upper-triangular factor, `n x n` with `n = 2*Tx`.
    pub r: RealMatrix,
    /// Transformed observation `Q^T y`, length `n`.
    pub z: Vec<Real>,
}

impl TriangularModel {
    /// Tree-search depth (number of real symbol dimensions).
    pub fn levels(&self) -> usize {
        self.r.cols()
    }
}

/// Triangularize the channel via modified Gram-Schmidt QR.
///
/// `h` is `m x n` with `m >= n` (checked at model construction);
/// `y` has length `m`.
pub fn triangularize(h: &RealMatrix, y: &[Real]) -> TriangularModel {
    let m = h.rows();
    let n = h.cols();
    debug_assert_eq!(y.len(), m);

    let mut q_cols: Vec<Vec<Real>> = Vec::with_capacity(n);
    let mut r = RealMatrix::zeros(n, n);

    for j in 0..n {
        let mut v = h.column(j);
        for (i, q_i) in q_cols.iter().enumerate() {
            let dot: Real = q_i.iter().zip(&v).map(|(&a, &b)| a * b).sum();
            r.set(i, j, dot);
            for (vk, &qk) in v.iter_mut().zip(q_i) {
                *vk -= dot * qk;
            }
        }
        let norm = v.iter().map(|&x| x * x).sum::<Real>().sqrt();
        r.set(j, j, norm);
        if norm > 1e-15 {
            for vk in v.iter_mut() {
                *vk /= norm;
            }
        } else {
            // Rank-deficient column: keep a zero q-column, tolerate the
            // accuracy loss downstream.
            for vk in v.iter_mut() {
                *vk = 0.0;
            }
        }
        q_cols.push(v);
    }

    let z = q_cols
        .iter()
        .map(|q_j| q_j.iter().zip(y).map(|(&a, &b)| a * b).sum())
        .collect();

    TriangularModel { r, z }
}
