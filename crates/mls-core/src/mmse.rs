//! Linear MMSE detection
//!
//! The low-complexity baseline the tree searches are measured against.
//! Solves the regularized normal equations
//!
//! ```text
//! (H^T H + Nv I) x = H^T y
//! ```
//!
//! and slices each dimension of the solution to the nearest
//! constellation amplitude. The noise-variance regularization keeps the
//! solve well behaved on poorly conditioned channels; a genuinely
//! rank-deficient Gram matrix is clamped inside the Cholesky solve and
//! degrades accuracy rather than failing.

use crate::candidate::{nearest_indices, Candidate, CandidateList};
use crate::detector::Detector;
use crate::lattice::triangularize;
use crate::metric::path_metric;
use crate::model::{DetectorConfig, SystemModel};
use crate::types::{DetResult, DetectorError, Real};

/// Linear MMSE detector with nearest-symbol slicing.
#[derive(Debug, Clone)]
pub struct MmseDetector {
    config: DetectorConfig,
}

impl MmseDetector {
    /// Create a detector, failing fast on contract violations.
    pub fn new(config: DetectorConfig) -> DetResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Unsliced MMSE estimate, useful for soft post-processing.
    pub fn estimate(&self, model: &SystemModel) -> DetResult<Vec<Real>> {
        self.check_model(model)?;
        let n = model.tx_dims();
        let mut a = model.h.gram();
        for i in 0..n {
            a.set(i, i, a.get(i, i) + model.noise_variance);
        }
        let b = model.h.transpose_mat_vec(&model.y);
        Ok(crate::matrix::cholesky_solve(&a, &b))
    }

    fn check_model(&self, model: &SystemModel) -> DetResult<()> {
        if model.tx_dims() != self.config.tx_dims() {
            return Err(DetectorError::DimensionMismatch {
                what: "channel matrix columns",
                expected: self.config.tx_dims(),
                actual: model.tx_dims(),
            });
        }
        Ok(())
    }
}

impl Detector for MmseDetector {
    /// Filter, slice, and report the sliced vector as a single
    /// candidate scored with the same metric as the tree searches.
    fn run(&mut self, model: &SystemModel) -> DetResult<CandidateList> {
        let estimate = self.estimate(model)?;
        let indices = nearest_indices(&model.constellation, &estimate);
        let symbols: Vec<Real> = indices
            .iter()
            .map(|&i| model.constellation.point(i))
            .collect();
        let tri = triangularize(&model.h, &model.y);
        let metric = path_metric(&tri, &symbols);
        Ok(CandidateList {
            candidates: vec![Candidate { indices, metric }],
        })
    }
}
