//! Synthetic MIMO channel and observation generation
//!
//! Produces one trial's worth of ground truth and observations: a
//! Rayleigh-fading channel matrix in its real-valued expansion, random
//! transmit symbols, and the noisy observation vector. Also owns the
//! `judge` operation that scores a detector's symbol-domain estimate
//! against the ground-truth indices.
//!
//! The complex channel entry `a + jb` expands into the real blocks
//!
//! ```text
//! [  a  b ]
//! [ -b  a ]
//! ```
//!
//! laid out as `H[i, j] = a`, `H[i+R, j+T] = a`, `H[i, j+T] = b`,
//! `H[i+R, j] = -b`, with `a, b ~ N(0, 1/2)`. The SNR-to-noise-variance
//! mapping assumes unit-average-power constellations:
//! `Nv = Rx / (10^(SNR/10) * bits_per_symbol)`.
//!
//! All randomness flows through a caller-supplied `StdRng`, so a trial
//! is fully determined by its seed regardless of which worker thread
//! runs it.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

use mls_core::candidate::nearest_indices;
use mls_core::constellation::Constellation;
use mls_core::matrix::RealMatrix;
use mls_core::model::{DetectorConfig, SystemModel};
use mls_core::types::{DetResult, Real, SymbolIndex};

/// Per-complex-dimension standard deviation of a unit-power Rayleigh tap.
const TAP_STDDEV: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// One generated trial: the detector-facing model plus the ground truth
/// the judge compares against.
#[derive(Debug, Clone)]
pub struct Trial {
    /// Inputs handed to the detector, read-only for the call.
    pub model: SystemModel,
    /// Ground-truth constellation index per real dimension.
    pub tx_indices: Vec<SymbolIndex>,
}

/// Trial generator for a fixed antenna/modulation configuration.
#[derive(Debug, Clone)]
pub struct ChannelGenerator {
    num_rx: usize,
    num_tx: usize,
    constellation: Arc<Constellation>,
    noise_variance: Real,
    noise_stddev: Real,
}

impl ChannelGenerator {
    /// Create a generator; the configuration contract is checked here.
    pub fn new(config: &DetectorConfig) -> DetResult<Self> {
        config.validate()?;
        let constellation = Arc::new(Constellation::for_modulation(config.modulation));
        let mut generator = Self {
            num_rx: config.num_rx,
            num_tx: config.num_tx,
            constellation,
            noise_variance: 0.0,
            noise_stddev: 0.0,
        };
        generator.set_snr(20.0);
        Ok(generator)
    }

    /// Set the operating SNR in dB, updating the noise variance.
    pub fn set_snr(&mut self, snr_db: f64) {
        let bits = self.constellation.bits_per_symbol() as f64;
        let nv = self.num_rx as f64 / (10f64.powf(snr_db / 10.0) * bits);
        self.noise_variance = nv as Real;
        self.noise_stddev = ((nv / 2.0) as Real).sqrt();
    }

    /// Current noise variance.
    pub fn noise_variance(&self) -> Real {
        self.noise_variance
    }

    /// Shared constellation table.
    pub fn constellation(&self) -> &Arc<Constellation> {
        &self.constellation
    }

    /// Bits carried by one trial (all transmit antennas).
    pub fn bits_per_trial(&self) -> u64 {
        (self.num_tx * self.constellation.bits_per_symbol()) as u64
    }

    /// Generate one trial from the supplied RNG.
    pub fn generate(&self, rng: &mut StdRng) -> Trial {
        let rows = 2 * self.num_rx;
        let cols = 2 * self.num_tx;
        let m = self.constellation.len();

        let mut h = RealMatrix::zeros(rows, cols);
        for j in 0..self.num_tx {
            for i in 0..self.num_rx {
                let a: f64 = rng.sample::<f64, _>(StandardNormal) * TAP_STDDEV;
                let b: f64 = rng.sample::<f64, _>(StandardNormal) * TAP_STDDEV;
                h.set(i, j, a as Real);
                h.set(i + self.num_rx, j + self.num_tx, a as Real);
                h.set(i, j + self.num_tx, b as Real);
                h.set(i + self.num_rx, j, -b as Real);
            }
        }

        let tx_indices: Vec<SymbolIndex> = (0..cols)
            .map(|_| rng.gen_range(0..m) as SymbolIndex)
            .collect();
        let tx_symbols: Vec<Real> = tx_indices
            .iter()
            .map(|&i| self.constellation.point(i))
            .collect();

        let mut y = h.mat_vec(&tx_symbols);
        for yi in y.iter_mut() {
            let n: f64 = rng.sample(StandardNormal);
            *yi += n as Real * self.noise_stddev;
        }

        let model = SystemModel::new(h, y, self.noise_variance, self.constellation.clone())
            .expect("generated model has consistent shapes");
        Trial { model, tx_indices }
    }

    /// Bit errors between the ground truth and an estimated symbol
    /// vector: each dimension is sliced to its nearest table entry and
    /// the index labels are compared bit-by-bit.
    pub fn judge(&self, trial: &Trial, symbols_est: &[Real]) -> u32 {
        let est_indices = nearest_indices(&self.constellation, symbols_est);
        trial
            .tx_indices
            .iter()
            .zip(&est_indices)
            .map(|(&tx, &est)| (tx ^ est).count_ones())
            .sum()
    }
}
