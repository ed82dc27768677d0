//! Max-log LLR computation from a candidate list
//!
//! Turns the K-best output list into soft bit reliabilities for a
//! downstream channel decoder. For each bit position the max-log
//! approximation uses the best candidate metric on each hypothesis:
//!
//! ```text
//! LLR(b) = (min metric with b=1  -  min metric with b=0) / Nv
//! ```
//!
//! so positive LLRs favor bit 0. A short list may contain no candidate
//! at all for one hypothesis of some bit; such bits are saturated at
//! `±MAX_LLR`, signed toward the hypothesis the list does contain. This
//! is the usual price of list detection: a wider list gives better
//! calibrated soft output.

use crate::candidate::CandidateList;
use crate::constellation::Constellation;
use crate::types::Real;

/// Saturation magnitude for bits with a one-sided hypothesis list.
pub const MAX_LLR: Real = 64.0;

/// Max-log LLRs for every bit of the detected vector, MSB-first within
/// each real dimension.
///
/// `list` must hold fully assigned candidates over `constellation`;
/// `noise_variance` scales the metric differences.
pub fn max_log_llrs(
    list: &CandidateList,
    constellation: &Constellation,
    noise_variance: Real,
) -> Vec<Real> {
    let Some(first) = list.candidates.first() else {
        return Vec::new();
    };
    let dims = first.indices.len();
    let bits = constellation.bits_per_dimension();
    let nv = if noise_variance > 0.0 {
        noise_variance
    } else {
        1.0
    };

    let mut llrs = Vec::with_capacity(dims * bits);
    for dim in 0..dims {
        for b in (0..bits).rev() {
            let mut min_zero = Real::INFINITY;
            let mut min_one = Real::INFINITY;
            for cand in &list.candidates {
                let bit = (cand.indices[dim] >> b) & 1 != 0;
                if bit {
                    min_one = min_one.min(cand.metric);
                } else {
                    min_zero = min_zero.min(cand.metric);
                }
            }
            let llr = match (min_zero.is_finite(), min_one.is_finite()) {
                (true, true) => ((min_one - min_zero) / nv).clamp(-MAX_LLR, MAX_LLR),
                (true, false) => MAX_LLR,
                (false, true) => -MAX_LLR,
                (false, false) => 0.0,
            };
            llrs.push(llr);
        }
    }
    llrs
}
