//! Path-metric evaluation
//!
//! The single numeric primitive both search strategies share. With the
//! triangularized system `(R, z)` and dimensions fixed from level `n-1`
//! down, the cost of assigning symbol `s` at level `l` is
//!
//! ```text
//! (z[l] - R[l,l]*s - sum_{j>l} R[l,j]*x[j])^2
//! ```
//!
//! Both searches first reduce the level to a scalar "level observation"
//! `b = z[l] - sum_{j>l} R[l,j]*x[j]` once per node, then score each
//! candidate symbol against it. Costs are squared terms, so the
//! cumulative metric is non-decreasing along any root-to-leaf path; the
//! pruning logic in both strategies relies on that invariant.

use crate::lattice::TriangularModel;
use crate::types::Real;

/// Residual observation at `level` after cancelling the already-fixed
/// dimensions `level+1..n` of `symbols`.
#[inline]
pub fn level_observation(tri: &TriangularModel, level: usize, symbols: &[Real]) -> Real {
    let n = tri.levels();
    let mut b = tri.z[level];
    for j in (level + 1)..n {
        b -= tri.r.get(level, j) * symbols[j];
    }
    b
}

/// Incremental cost of assigning a symbol with amplitude `s` at a level
/// whose residual observation is `b` and diagonal pivot is `r_diag`.
#[inline]
pub fn branch_cost(b: Real, r_diag: Real, s: Real) -> Real {
    let d = b - r_diag * s;
    d * d
}

/// Full path metric `||z - R x||^2` of a complete assignment.
///
/// Used by exhaustive oracles in tests and by callers that need to score
/// an externally produced vector; the searches themselves accumulate
/// metrics incrementally.
pub fn path_metric(tri: &TriangularModel, symbols: &[Real]) -> Real {
    let n = tri.levels();
    debug_assert_eq!(symbols.len(), n);
    let mut total = 0.0;
    for level in (0..n).rev() {
        let b = level_observation(tri, level, symbols);
        total += branch_cost(b, tri.r.get(level, level), symbols[level]);
    }
    total
}
