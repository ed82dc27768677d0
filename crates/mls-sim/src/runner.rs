//! Multi-threaded trial runner
//!
//! Drives (generate trial → run detector → judge) loops across worker
//! threads. Workers share nothing but a handful of atomic aggregate
//! counters, an atomic trial cursor, and a cooperative stop flag; each
//! worker owns its detector instance and its trials' RNGs outright.
//!
//! Determinism: a trial's RNG is seeded from `(base_seed, trial_index)`,
//! not from the worker that happens to claim it, so the aggregate error
//! counts over N trials are identical for any thread count. The stop
//! flag (raised when the target error count is reached) is checked
//! between trials only; a trial in flight always finishes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mls_core::detector::Detector;
use mls_core::kbest::KBestDetector;
use mls_core::mmse::MmseDetector;
use mls_core::model::DetectorConfig;
use mls_core::sphere::SphereDetector;
use mls_core::types::DetResult;

use crate::channel::ChannelGenerator;
use crate::stats::LinkStats;

/// Detection strategy to benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectorKind {
    /// K-best list detection with the given width.
    KBest { k: usize },
    /// Sphere decoding (maximum likelihood).
    Sphere,
    /// Linear MMSE baseline.
    Mmse,
}

/// Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of trials to attempt.
    pub trials: u64,
    /// Worker threads.
    pub threads: usize,
    /// Base seed; per-trial seeds derive from it.
    pub base_seed: u64,
    /// Operating SNR in dB.
    pub snr_db: f64,
    /// Stop early once this many bit errors accumulate (0 = never).
    pub max_bit_errors: u64,
    /// Trials between flushes of worker-local counters to the shared
    /// atomics.
    pub batch: u64,
    /// Progress log period; `None` disables the reporter.
    pub progress_interval: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            threads: 1,
            base_seed: 0,
            snr_db: 20.0,
            max_bit_errors: 0,
            batch: 64,
            progress_interval: None,
        }
    }
}

/// Worker-owned detection engine.
enum Engine {
    KBest(KBestDetector),
    Sphere(SphereDetector),
    Mmse(MmseDetector),
}

impl Engine {
    fn build(config: DetectorConfig, kind: DetectorKind) -> DetResult<Self> {
        Ok(match kind {
            DetectorKind::KBest { k } => Engine::KBest(KBestDetector::new(config, k)?),
            DetectorKind::Sphere => Engine::Sphere(SphereDetector::new(config)?),
            DetectorKind::Mmse => Engine::Mmse(MmseDetector::new(config)?),
        })
    }
}

/// Shared aggregate state; the only cross-thread mutation in a run.
#[derive(Default)]
struct Shared {
    cursor: AtomicU64,
    trials: AtomicU64,
    total_bits: AtomicU64,
    error_bits: AtomicU64,
    error_frames: AtomicU64,
    nodes_visited: AtomicU64,
    stop: AtomicBool,
    active_workers: AtomicU64,
}

impl Shared {
    fn flush(&self, local: &mut LinkStats) {
        self.trials.fetch_add(local.trials, Ordering::Relaxed);
        self.total_bits.fetch_add(local.total_bits, Ordering::Relaxed);
        self.error_bits.fetch_add(local.error_bits, Ordering::Relaxed);
        self.error_frames
            .fetch_add(local.error_frames, Ordering::Relaxed);
        self.nodes_visited
            .fetch_add(local.nodes_visited, Ordering::Relaxed);
        *local = LinkStats::default();
    }

    fn snapshot(&self) -> LinkStats {
        LinkStats {
            trials: self.trials.load(Ordering::Relaxed),
            total_bits: self.total_bits.load(Ordering::Relaxed),
            error_bits: self.error_bits.load(Ordering::Relaxed),
            error_frames: self.error_frames.load(Ordering::Relaxed),
            nodes_visited: self.nodes_visited.load(Ordering::Relaxed),
        }
    }
}

/// Per-trial seed derivation (splitmix64 over base seed and index).
fn trial_seed(base: u64, index: u64) -> u64 {
    let mut z = base ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Run a batch of trials and return the aggregate statistics.
pub fn run_trials(
    det_config: DetectorConfig,
    kind: DetectorKind,
    runner: &RunnerConfig,
) -> DetResult<LinkStats> {
    det_config.validate()?;
    // Fail fast on detector contract violations before spawning anything.
    Engine::build(det_config, kind)?;

    let mut generator = ChannelGenerator::new(&det_config)?;
    generator.set_snr(runner.snr_db);

    let threads = runner.threads.max(1);
    let batch = runner.batch.max(1);
    let shared = Shared::default();
    shared.active_workers.store(threads as u64, Ordering::Relaxed);

    info!(
        trials = runner.trials,
        threads,
        snr_db = runner.snr_db,
        ?kind,
        "starting run"
    );

    thread::scope(|s| -> DetResult<()> {
        let mut handles = Vec::with_capacity(threads);
        for worker in 0..threads {
            let shared = &shared;
            let generator = &generator;
            handles.push(s.spawn(move || -> DetResult<()> {
                let result = worker_loop(det_config, kind, runner, generator, shared, batch);
                shared.active_workers.fetch_sub(1, Ordering::Relaxed);
                debug!(worker, "worker finished");
                result
            }));
        }

        if let Some(interval) = runner.progress_interval {
            let shared = &shared;
            s.spawn(move || {
                while shared.active_workers.load(Ordering::Relaxed) > 0 {
                    thread::sleep(interval);
                    let snap = shared.snapshot();
                    info!(
                        trials = snap.trials,
                        error_bits = snap.error_bits,
                        ber = snap.ber(),
                        "progress"
                    );
                }
            });
        }

        for handle in handles {
            handle.join().expect("worker thread panicked")?;
        }
        Ok(())
    })?;

    let stats = shared.snapshot();
    info!(
        trials = stats.trials,
        ber = stats.ber(),
        fer = stats.fer(),
        avg_nodes = stats.avg_nodes(),
        "run complete"
    );
    Ok(stats)
}

fn worker_loop(
    det_config: DetectorConfig,
    kind: DetectorKind,
    runner: &RunnerConfig,
    generator: &ChannelGenerator,
    shared: &Shared,
    batch: u64,
) -> DetResult<()> {
    let mut engine = Engine::build(det_config, kind)?;
    let mut local = LinkStats::default();
    let bits_per_trial = generator.bits_per_trial();

    loop {
        if shared.stop.load(Ordering::Relaxed) {
            break;
        }
        let index = shared.cursor.fetch_add(1, Ordering::Relaxed);
        if index >= runner.trials {
            break;
        }

        let mut rng = StdRng::seed_from_u64(trial_seed(runner.base_seed, index));
        let trial = generator.generate(&mut rng);

        let (list, nodes) = match &mut engine {
            Engine::KBest(det) => (det.run(&trial.model)?, 0),
            Engine::Sphere(det) => {
                let list = det.run(&trial.model)?;
                (list, det.last_nodes_visited())
            }
            Engine::Mmse(det) => (det.run(&trial.model)?, 0),
        };
        let best = list
            .best()
            .expect("detectors always return at least one candidate");
        let symbols = best.symbols(generator.constellation());
        let bit_errors = generator.judge(&trial, &symbols) as u64;

        local.record_trial(bit_errors, bits_per_trial, nodes);

        if local.trials >= batch {
            shared.flush(&mut local);
            if runner.max_bit_errors > 0
                && shared.error_bits.load(Ordering::Relaxed) >= runner.max_bit_errors
            {
                shared.stop.store(true, Ordering::Relaxed);
            }
        }
    }
    shared.flush(&mut local);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_core::constellation::Modulation;
    use mls_core::types::DetectorError;

    fn small_config() -> DetectorConfig {
        DetectorConfig {
            num_rx: 2,
            num_tx: 2,
            modulation: Modulation::Qpsk,
        }
    }

    #[test]
    fn test_trial_seed_spreads() {
        let a = trial_seed(1, 0);
        let b = trial_seed(1, 1);
        let c = trial_seed(2, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_aggregate_independent_of_thread_count() {
        let runner1 = RunnerConfig {
            trials: 200,
            threads: 1,
            base_seed: 1234,
            snr_db: 6.0,
            ..Default::default()
        };
        let runner4 = RunnerConfig {
            threads: 4,
            ..runner1.clone()
        };

        let kind = DetectorKind::KBest { k: 4 };
        let single = run_trials(small_config(), kind, &runner1).unwrap();
        let multi = run_trials(small_config(), kind, &runner4).unwrap();

        assert_eq!(single.trials, 200);
        assert_eq!(multi.trials, 200);
        assert_eq!(single.error_bits, multi.error_bits);
        assert_eq!(single.error_frames, multi.error_frames);
    }

    #[test]
    fn test_sphere_run_counts_nodes() {
        let runner = RunnerConfig {
            trials: 50,
            threads: 2,
            base_seed: 7,
            snr_db: 15.0,
            ..Default::default()
        };
        let stats = run_trials(small_config(), DetectorKind::Sphere, &runner).unwrap();
        assert_eq!(stats.trials, 50);
        assert!(stats.nodes_visited > 0);
    }

    #[test]
    fn test_high_snr_beats_low_snr() {
        let base = RunnerConfig {
            trials: 300,
            threads: 2,
            base_seed: 42,
            snr_db: 0.0,
            ..Default::default()
        };
        let noisy = run_trials(small_config(), DetectorKind::Sphere, &base).unwrap();
        let clean = run_trials(
            small_config(),
            DetectorKind::Sphere,
            &RunnerConfig {
                snr_db: 25.0,
                ..base
            },
        )
        .unwrap();
        assert!(clean.ber() <= noisy.ber());
    }

    #[test]
    fn test_error_threshold_stops_early() {
        let runner = RunnerConfig {
            trials: 100_000,
            threads: 2,
            base_seed: 9,
            snr_db: -10.0, // extremely noisy: errors accumulate fast
            max_bit_errors: 50,
            batch: 8,
            ..Default::default()
        };
        let stats = run_trials(small_config(), DetectorKind::Mmse, &runner).unwrap();
        assert!(stats.error_bits >= 50);
        assert!(
            stats.trials < 100_000,
            "stop flag should cut the run short, ran {}",
            stats.trials
        );
    }

    #[test]
    fn test_sphere_never_worse_than_kbest() {
        // The sphere decoder is exact ML; a width-limited list search can
        // only match or exceed its best metric.
        let config = small_config();
        let mut generator = ChannelGenerator::new(&config).unwrap();
        generator.set_snr(8.0);

        let mut sphere = SphereDetector::new(config).unwrap();
        let mut kbest = KBestDetector::new(config, 4).unwrap();

        for index in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(trial_seed(5, index));
            let trial = generator.generate(&mut rng);
            let ml = sphere.run(&trial.model).unwrap();
            let list = kbest.run(&trial.model).unwrap();
            assert!(
                ml.best().unwrap().metric <= list.best().unwrap().metric + 1e-9,
                "trial {index}: sphere metric above k-best metric"
            );
        }
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let bad = DetectorConfig {
            num_rx: 1,
            num_tx: 2,
            modulation: Modulation::Qpsk,
        };
        let err = run_trials(bad, DetectorKind::Sphere, &RunnerConfig::default()).unwrap_err();
        assert_eq!(err, DetectorError::RxLessThanTx { rx: 1, tx: 2 });

        let err = run_trials(
            small_config(),
            DetectorKind::KBest { k: 0 },
            &RunnerConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, DetectorError::InvalidListWidth(0));
    }
}
