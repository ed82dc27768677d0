//! Link-level error statistics
//!
//! Aggregate BER/FER bookkeeping for a simulation run. Workers keep a
//! private `LinkStats` and merge it into the shared atomics in batches;
//! the final report is read back into one `LinkStats` for the caller.
//!
//! ## Example
//!
//! ```rust
//! use mls_sim::stats::LinkStats;
//!
//! let mut stats = LinkStats::default();
//! stats.record_trial(2, 16, 10); // 2 bit errors out of 16 bits, 10 nodes
//! stats.record_trial(0, 16, 4);
//! assert_eq!(stats.trials, 2);
//! assert!((stats.ber() - 2.0 / 32.0).abs() < 1e-12);
//! assert!((stats.fer() - 0.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// Aggregate counters for one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    /// Trials completed.
    pub trials: u64,
    /// Total information bits carried by those trials.
    pub total_bits: u64,
    /// Bits decided incorrectly.
    pub error_bits: u64,
    /// Trials with at least one bit error.
    pub error_frames: u64,
    /// Search nodes visited (sphere decoder only; zero otherwise).
    pub nodes_visited: u64,
}

impl LinkStats {
    /// Record one completed trial.
    pub fn record_trial(&mut self, bit_errors: u64, bits: u64, nodes: u64) {
        self.trials += 1;
        self.total_bits += bits;
        self.error_bits += bit_errors;
        if bit_errors > 0 {
            self.error_frames += 1;
        }
        self.nodes_visited += nodes;
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &LinkStats) {
        self.trials += other.trials;
        self.total_bits += other.total_bits;
        self.error_bits += other.error_bits;
        self.error_frames += other.error_frames;
        self.nodes_visited += other.nodes_visited;
    }

    /// Bit error rate.
    pub fn ber(&self) -> f64 {
        if self.total_bits == 0 {
            0.0
        } else {
            self.error_bits as f64 / self.total_bits as f64
        }
    }

    /// Frame error rate.
    pub fn fer(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.error_frames as f64 / self.trials as f64
        }
    }

    /// Average visited nodes per trial, the sphere decoder's complexity
    /// proxy.
    pub fn avg_nodes(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.nodes_visited as f64 / self.trials as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_empty() {
        let stats = LinkStats::default();
        assert_eq!(stats.ber(), 0.0);
        assert_eq!(stats.fer(), 0.0);
        assert_eq!(stats.avg_nodes(), 0.0);
    }

    #[test]
    fn test_merge_adds_counters() {
        let mut a = LinkStats::default();
        a.record_trial(1, 8, 20);
        let mut b = LinkStats::default();
        b.record_trial(0, 8, 12);
        b.record_trial(3, 8, 40);
        a.merge(&b);
        assert_eq!(a.trials, 3);
        assert_eq!(a.total_bits, 24);
        assert_eq!(a.error_bits, 4);
        assert_eq!(a.error_frames, 2);
        assert_eq!(a.nodes_visited, 72);
    }
}
