//! # MIMO List-Detection Core
//!
//! Detection algorithms for multi-antenna (MIMO) receivers operating on
//! the real-valued decomposition of the complex system model. The crate
//! centers on two combinatorial tree searches over the same
//! triangularized lattice:
//!
//! - **K-best**: breadth-limited, level-synchronous search returning an
//!   ordered candidate list of fixed width K
//! - **Sphere decoding**: depth-first branch-and-bound with a shrinking
//!   radius and Schnorr-Euchner enumeration, returning the
//!   maximum-likelihood candidate plus a node-visit count
//!
//! plus a linear MMSE baseline, shared QR preprocessing, and max-log LLR
//! extraction from candidate lists for coded pipelines.
//!
//! ## Signal Flow
//!
//! ```text
//! (H, y, Nv) → triangularize → tree search (K-best / sphere) → candidates
//!                                   │                              │
//!                             path metrics                   symbols / bits / LLRs
//! ```
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
//! let mut detector = KBestDetector::new(config, 2).unwrap();
//!
//! let constellation = Arc::new(Constellation::for_modulation(Modulation::Qpsk));
//! let model = SystemModel::new(
//!     RealMatrix::identity(2),
//!     vec![0.5, -0.7],
//!     0.1,
//!     constellation,
//! ).unwrap();
//!
//! let list = detector.run(&model).unwrap();
//! assert!(list.is_sorted());
//! let best_symbols = list.best().unwrap().symbols(&model.constellation);
//! assert_eq!(best_symbols.len(), 2);
//! ```

pub mod candidate;
pub mod constellation;
pub mod detector;
pub mod kbest;
pub mod lattice;
pub mod llr;
pub mod matrix;
pub mod metric;
pub mod mmse;
pub mod model;
pub mod sphere;
pub mod types;

pub use candidate::{Candidate, CandidateList};
pub use constellation::{Constellation, Modulation};
pub use detector::Detector;
pub use kbest::KBestDetector;
pub use lattice::{triangularize, TriangularModel};
pub use matrix::RealMatrix;
pub use mmse::MmseDetector;
pub use model::{DetectorConfig, SystemModel};
pub use sphere::SphereDetector;
pub use types::{DetResult, DetectorError, Real, SymbolIndex};
