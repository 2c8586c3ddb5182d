// af_detect.rs
// Builds the selected architecture from command-line flags (or a JSON config)
// and prints its layer summary.
//
// Usage:
//   af_detect --arch SENET --epochs 60 --lr-milestones 20,40 --seed 7
//   af_detect --config configs/senet.json --summary false
//
// Log verbosity follows --log, else RUST_LOG, else info. --log debug lists every
// layer as it is added.

use anyhow::{Context, Result};
use clap::Parser;
use rta_cnn::cli::{log_filter, Args};
use rta_cnn::config::{load_config, validate_config, TrainingConfig};
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&args))
        .init();

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            let config = TrainingConfig::from_args(&args);
            validate_config(&config).context("invalid command-line arguments")?;
            config
        }
    };
    info!(
        arch = %config.arch,
        experiment_index = ?config.experiment_index,
        epochs = config.epochs,
        batchsize = config.batchsize,
        lr = config.lr,
        lr_milestones = ?config.lr_milestones,
        "training configuration"
    );

    let start = Instant::now();
    let model = match config.seed {
        Some(seed) => config.arch.build_with_seed(seed),
        None => config.arch.build(),
    }
    .with_context(|| format!("building {}", config.arch))?;
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "built {}",
        model.name()
    );

    if args.summary {
        print!("{}", model.summary());
    }
    Ok(())
}
