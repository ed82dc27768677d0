//! System model and detector configuration
//!
//! The `SystemModel` is what the channel/observation collaborator hands
//! to a detector for one trial: the real-expanded channel matrix, the
//! noisy observation, the noise variance and a shared constellation
//! table. It is read-only to the detection core for the duration of one
//! `run` call.
//!
//! `DetectorConfig` is the validated construction-time configuration.
//! Contract violations (Rx < Tx, zero antennas, bad modulation) are
//! caught here once, so the search code never re-checks them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constellation::{Constellation, Modulation};
use crate::matrix::RealMatrix;
use crate::types::{DetResult, DetectorError, Real};

/// Antenna and modulation configuration, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of receive antennas (complex domain).
    pub num_rx: usize,
    /// Number of transmit antennas (complex domain).
    pub num_tx: usize,
    /// Modulation order.
    pub modulation: Modulation,
}

impl DetectorConfig {
    /// Check the construction-time contract.
    pub fn validate(&self) -> DetResult<()> {
        if self.num_rx == 0 || self.num_tx == 0 {
            return Err(DetectorError::ZeroAntennas);
        }
        if self.num_rx < self.num_tx {
            return Err(DetectorError::RxLessThanTx {
                rx: self.num_rx,
                tx: self.num_tx,
            });
        }
        Ok(())
    }

    /// Real-domain observation dimension (2 * Rx).
    pub fn rx_dims(&self) -> usize {
        2 * self.num_rx
    }

    /// Real-domain symbol dimension (2 * Tx), the tree-search depth.
    pub fn tx_dims(&self) -> usize {
        2 * self.num_tx
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            num_rx: 4,
            num_tx: 4,
            modulation: Modulation::Qam16,
        }
    }
}

/// One trial's worth of inputs to a detector.
#[derive(Debug, Clone)]
pub struct SystemModel {
    /// Real-expanded channel matrix, `2*Rx x 2*Tx`.
    pub h: RealMatrix,
    /// Real-expanded observation, length `2*Rx`.
    pub y: Vec<Real>,
    /// Noise variance per complex dimension.
    pub noise_variance: Real,
    /// Per-dimension symbol table, shared across trials.
    pub constellation: Arc<Constellation>,
}

impl SystemModel {
    /// Bundle trial inputs, checking shapes against each other.
    pub fn new(
        h: RealMatrix,
        y: Vec<Real>,
        noise_variance: Real,
        constellation: Arc<Constellation>,
    ) -> DetResult<Self> {
        if y.len() != h.rows() {
            return Err(DetectorError::DimensionMismatch {
                what: "observation vector",
                expected: h.rows(),
                actual: y.len(),
            });
        }
        if h.rows() < h.cols() {
            return Err(DetectorError::RxLessThanTx {
                rx: h.rows() / 2,
                tx: h.cols() / 2,
            });
        }
        Ok(Self {
            h,
            y,
            noise_variance,
            constellation,
        })
    }

    /// Real-domain symbol dimension (tree-search depth).
    pub fn tx_dims(&self) -> usize {
        self.h.cols()
    }

    /// Real-domain observation dimension.
    pub fn rx_dims(&self) -> usize {
        self.h.rows()
    }
}
