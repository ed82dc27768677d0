//! # MIMO Link-Level Simulation Harness
//!
//! The collaborator crate around the detection core: it generates
//! synthetic channel trials, drives detectors across worker threads, and
//! measures the resulting bit and frame error rates.
//!
//! ## Trial Flow
//!
//! ```text
//! seed ─► ChannelGenerator ─► SystemModel ─► Detector ─► judge ─► LinkStats
//!               │                                          ▲
//!               └────────── ground-truth indices ──────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use mls_core::constellation::Modulation;
//! use mls_core::model::DetectorConfig;
//! use mls_sim::runner::{run_trials, DetectorKind, RunnerConfig};
//!
//! let config = DetectorConfig { num_rx: 2, num_tx: 2, modulation: Modulation::Qpsk };
//! let runner = RunnerConfig { trials: 100, snr_db: 12.0, ..Default::default() };
//! let stats = run_trials(config, DetectorKind::KBest { k: 8 }, &runner).unwrap();
//! assert_eq!(stats.trials, 100);
//! ```

pub mod channel;
pub mod runner;
pub mod stats;

pub use channel::{ChannelGenerator, Trial};
pub use runner::{run_trials, DetectorKind, RunnerConfig};
pub use stats::LinkStats;
