//! Candidate representation and result materialization
//!
//! Inside the searches a candidate is an index path: one constellation
//! index per real dimension, plus the cumulative metric. The
//! materializer turns index paths back into the representations callers
//! consume — symbol-amplitude vectors for error-rate judging, bit
//! vectors for coded pipelines. No search logic lives here.

use crate::constellation::Constellation;
use crate::types::{Real, SymbolIndex};

/// A fully assigned candidate: index path plus cumulative path metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Constellation index per real dimension, `indices[l]` for level `l`.
    pub indices: Vec<SymbolIndex>,
    /// Cumulative squared-distance metric.
    pub metric: Real,
}

impl Candidate {
    /// Symbol-amplitude vector for this candidate.
    pub fn symbols(&self, constellation: &Constellation) -> Vec<Real> {
        symbols_from_indices(constellation, &self.indices)
    }

    /// Hard bit decisions for this candidate, MSB-first per dimension.
    pub fn bits(&self, constellation: &Constellation) -> Vec<bool> {
        bits_from_indices(constellation, &self.indices)
    }
}

/// Ordered candidate list, ascending metric.
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    pub candidates: Vec<Candidate>,
}

impl CandidateList {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Best (lowest-metric) candidate, if any.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// True if metrics are sorted ascending.
    pub fn is_sorted(&self) -> bool {
        self.candidates
            .windows(2)
            .all(|w| w[0].metric <= w[1].metric)
    }
}

/// Map an index path to per-dimension symbol amplitudes.
pub fn symbols_from_indices(constellation: &Constellation, indices: &[SymbolIndex]) -> Vec<Real> {
    indices.iter().map(|&i| constellation.point(i)).collect()
}

/// Map an index path to hard bits, MSB-first within each dimension.
pub fn bits_from_indices(constellation: &Constellation, indices: &[SymbolIndex]) -> Vec<bool> {
    let bits = constellation.bits_per_dimension();
    let mut out = Vec::with_capacity(indices.len() * bits);
    for &index in indices {
        for b in (0..bits).rev() {
            out.push((index >> b) & 1 != 0);
        }
    }
    out
}

/// Map a symbol-amplitude vector back to nearest constellation indices.
///
/// This is the slicing step used by the judge and by linear detectors
/// whose estimates do not land exactly on table entries.
pub fn nearest_indices(constellation: &Constellation, symbols: &[Real]) -> Vec<SymbolIndex> {
    symbols
        .iter()
        .map(|&s| constellation.nearest_index(s))
        .collect()
}
