//! K-best tree search — breadth-limited list detection
//!
//! Level-synchronous search over the triangularized system: starting
//! from the empty root at the last dimension, every surviving partial
//! candidate is expanded by every constellation symbol, children are
//! scored with the shared path-metric primitive, and only the K smallest
//! survive to the next level. The terminal survivors, sorted ascending
//! by metric, are the output list.
//!
//! At early levels the frontier may hold fewer than K nodes; full
//! enumeration there is expected, not an error. Ties are broken by
//! first-seen order (a stable sort), so the output is bit-for-bit
//! reproducible for a fixed input ordering of constellation points.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use mls_core::constellation::{Constellation, Modulation};
//! use mls_core::detector::Detector;
//! use mls_core::kbest::KBestDetector;
//! use mls_core::matrix::RealMatrix;
//! use mls_core::model::{DetectorConfig, SystemModel};
//!
//! let config = DetectorConfig { num_rx: 1, num_tx: 1, modulation: Modulation::Qpsk };
//! let mut detector = KBestDetector::new(config, 4).unwrap();
//!
//! let cons = Arc::new(Constellation::for_modulation(Modulation::Qpsk));
//! let model = SystemModel::new(
//!     RealMatrix::identity(2),
//!     vec![0.6, -0.8],
//!     0.1,
//!     cons,
//! ).unwrap();
//!
//! let list = detector.run(&model).unwrap();
//! assert_eq!(list.len(), 4); // 2 points ^ 2 real dimensions
//! assert!(list.is_sorted());
//! ```

use crate::candidate::{Candidate, CandidateList};
use crate::detector::Detector;
use crate::lattice::triangularize;
use crate::metric::{branch_cost, level_observation};
use crate::model::{DetectorConfig, SystemModel};
use crate::types::{DetResult, DetectorError, Real, SymbolIndex};

/// Breadth-limited list detector with fixed width K.
#[derive(Debug, Clone)]
pub struct KBestDetector {
    config: DetectorConfig,
    k: usize,
}

/// Partial assignment during the level sweep. `indices`/`symbols` are
/// full-length with only levels `>= current` meaningful.
#[derive(Debug, Clone)]
struct Survivor {
    indices: Vec<SymbolIndex>,
    symbols: Vec<Real>,
    metric: Real,
}

impl KBestDetector {
    /// Create a detector, failing fast on contract violations.
    pub fn new(config: DetectorConfig, k: usize) -> DetResult<Self> {
        config.validate()?;
        if k == 0 {
            return Err(DetectorError::InvalidListWidth(k));
        }
        Ok(Self { config, k })
    }

    /// Configured list width.
    pub fn k(&self) -> usize {
        self.k
    }

    fn check_model(&self, model: &SystemModel) -> DetResult<()> {
        if model.tx_dims() != self.config.tx_dims() {
            return Err(DetectorError::DimensionMismatch {
                what: "channel matrix columns",
                expected: self.config.tx_dims(),
                actual: model.tx_dims(),
            });
        }
        if model.rx_dims() != self.config.rx_dims() {
            return Err(DetectorError::DimensionMismatch {
                what: "channel matrix rows",
                expected: self.config.rx_dims(),
                actual: model.rx_dims(),
            });
        }
        Ok(())
    }
}

impl Detector for KBestDetector {
    fn run(&mut self, model: &SystemModel) -> DetResult<CandidateList> {
        self.check_model(model)?;

        let tri = triangularize(&model.h, &model.y);
        let n = tri.levels();
        let cons = &model.constellation;
        let m = cons.len();

        let mut survivors = vec![Survivor {
            indices: vec![0; n],
            symbols: vec![0.0; n],
            metric: 0.0,
        }];

        for level in (0..n).rev() {
            let mut children = Vec::with_capacity(survivors.len() * m);
            for parent in &survivors {
                let b = level_observation(&tri, level, &parent.symbols);
                let r_diag = tri.r.get(level, level);
                for idx in 0..m {
                    let s = cons.point(idx as SymbolIndex);
                    let mut child = parent.clone();
                    child.indices[level] = idx as SymbolIndex;
                    child.symbols[level] = s;
                    child.metric += branch_cost(b, r_diag, s);
                    children.push(child);
                }
            }
            // Stable sort keeps first-seen order on equal metrics, which
            // makes the retained set deterministic.
            children.sort_by(|a, b| a.metric.total_cmp(&b.metric));
            children.truncate(self.k);
            survivors = children;
        }

        Ok(CandidateList {
            candidates: survivors
                .into_iter()
                .map(|s| Candidate {
                    indices: s.indices,
                    metric: s.metric,
                })
                .collect(),
        })
    }
}
