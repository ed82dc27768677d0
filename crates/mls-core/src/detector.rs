//! Common detection contract
//!
//! Every detection strategy — list search, branch-and-bound, linear —
//! takes one read-only `SystemModel` and returns an ordered candidate
//! list. A single-output strategy returns a list of length one. The two
//! tree searches are deliberately independent implementations of this
//! contract; neither warm-starts the other.

use crate::candidate::CandidateList;
use crate::model::SystemModel;
use crate::types::DetResult;

/// A detection strategy over one system model.
///
/// `run` is atomic from the caller's perspective: it either returns a
/// complete candidate list or an error, never a partial result. Detectors
/// take `&mut self` only for per-call statistics (node counters); no
/// state carries over between calls in a way that affects results.
pub trait Detector {
    /// Detect transmitted symbols for one trial.
    fn run(&mut self, model: &SystemModel) -> DetResult<CandidateList>;
}
