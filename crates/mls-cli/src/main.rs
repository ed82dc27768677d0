//! MIMO Link-Level Simulator Command-Line Interface
//!
//! Sweeps SNR points for a chosen detector and prints BER/FER tables.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mls_core::constellation::Modulation;
use mls_core::model::DetectorConfig;
use mls_sim::runner::{run_trials, DetectorKind, RunnerConfig};

#[derive(Parser)]
#[command(name = "mls")]
#[command(author, version, about = "MIMO link-level simulator", long_about = None)]
struct Cli {
    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DetectorArg {
    /// K-best list detection
    Kbest,
    /// Sphere decoding (maximum likelihood)
    Sphere,
    /// Linear MMSE baseline
    Mmse,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModulationArg {
    Qpsk,
    Qam16,
    Qam64,
    Qam256,
}

impl From<ModulationArg> for Modulation {
    fn from(arg: ModulationArg) -> Self {
        match arg {
            ModulationArg::Qpsk => Modulation::Qpsk,
            ModulationArg::Qam16 => Modulation::Qam16,
            ModulationArg::Qam64 => Modulation::Qam64,
            ModulationArg::Qam256 => Modulation::Qam256,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Measure BER/FER over a range of SNR points
    Ber {
        /// Transmit antennas
        #[arg(long, default_value = "4")]
        tx: usize,

        /// Receive antennas
        #[arg(long, default_value = "4")]
        rx: usize,

        /// Modulation order
        #[arg(long, value_enum, default_value = "qam16")]
        modulation: ModulationArg,

        /// Detection algorithm
        #[arg(long, value_enum, default_value = "kbest")]
        detector: DetectorArg,

        /// List width for the K-best detector
        #[arg(short, long, default_value = "16")]
        k: usize,

        /// First SNR point in dB
        #[arg(long, default_value = "10.0")]
        snr_start: f64,

        /// Last SNR point in dB (inclusive)
        #[arg(long, default_value = "20.0")]
        snr_stop: f64,

        /// SNR step in dB
        #[arg(long, default_value = "2.0")]
        snr_step: f64,

        /// Trials per SNR point
        #[arg(short, long, default_value = "10000")]
        trials: u64,

        /// Worker threads
        #[arg(long, default_value = "4")]
        threads: usize,

        /// Base seed for reproducible runs
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Stop an SNR point early after this many bit errors (0 = never)
        #[arg(long, default_value = "0")]
        max_errors: u64,

        /// Progress log period in seconds (0 = silent)
        #[arg(long, default_value = "5")]
        progress: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Ber {
            tx,
            rx,
            modulation,
            detector,
            k,
            snr_start,
            snr_stop,
            snr_step,
            trials,
            threads,
            seed,
            max_errors,
            progress,
        } => {
            if snr_step <= 0.0 {
                bail!("--snr-step must be positive");
            }

            let config = DetectorConfig {
                num_rx: rx,
                num_tx: tx,
                modulation: modulation.into(),
            };
            let kind = match detector {
                DetectorArg::Kbest => DetectorKind::KBest { k },
                DetectorArg::Sphere => DetectorKind::Sphere,
                DetectorArg::Mmse => DetectorKind::Mmse,
            };

            info!(?kind, tx, rx, ?config.modulation, "BER sweep");
            println!(
                "{:>8} {:>12} {:>12} {:>10} {:>12} {:>10}",
                "SNR[dB]", "BER", "FER", "trials", "avg nodes", "time[s]"
            );

            let mut snr = snr_start;
            while snr <= snr_stop + 1e-9 {
                let runner = RunnerConfig {
                    trials,
                    threads,
                    base_seed: seed,
                    snr_db: snr,
                    max_bit_errors: max_errors,
                    progress_interval: (progress > 0).then(|| Duration::from_secs(progress)),
                    ..Default::default()
                };
                let start = Instant::now();
                let stats = run_trials(config, kind, &runner)
                    .with_context(|| format!("running SNR point {snr} dB"))?;
                println!(
                    "{:>8.1} {:>12.3e} {:>12.3e} {:>10} {:>12.1} {:>10.2}",
                    snr,
                    stats.ber(),
                    stats.fer(),
                    stats.trials,
                    stats.avg_nodes(),
                    start.elapsed().as_secs_f64()
                );
                snr += snr_step;
            }
        }
    }

    Ok(())
}
