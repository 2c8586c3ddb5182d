//! Training configuration
//!
//! This module provides the validated training configuration shared by the
//! command line and JSON config files.

use crate::architectures::Architecture;
use crate::cli::Args;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Hyperparameters of one training run.
///
/// Fields missing from a JSON file take the command-line defaults.
///
/// # Example
///
/// ```json
/// {
///   "experiment_index": 3,
///   "arch": "SENET",
///   "epochs": 60,
///   "batchsize": 32,
///   "lr": 0.001,
///   "lr_milestones": [20, 40]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fold held out for validation
    pub experiment_index: Option<i64>,

    /// Architecture to train, by name (e.g. "RTA_CNN")
    pub arch: Architecture,

    /// Number of total epochs to run
    pub epochs: usize,

    /// Mini-batch size
    pub batchsize: usize,

    /// Maximum learning rate
    pub lr: f64,

    /// Epochs at which the learning rate drops, strictly increasing
    pub lr_milestones: Vec<usize>,

    /// Weight initialisation seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            experiment_index: None,
            arch: Architecture::RtaCnn,
            epochs: 100,
            batchsize: 48,
            lr: 1e-4,
            lr_milestones: Vec::new(),
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Copies the training fields from parsed command-line arguments.
    pub fn from_args(args: &Args) -> Self {
        Self {
            experiment_index: args.experiment_index,
            arch: args.arch,
            epochs: args.epochs,
            batchsize: args.batchsize,
            lr: args.lr,
            lr_milestones: args.lr_milestones.clone(),
            seed: args.seed,
        }
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it and checks it with [`validate_config`].
///
/// # Examples
///
/// ```no_run
/// use rta_cnn::config::load_config;
///
/// let cfg = load_config("configs/senet.json").unwrap();
/// println!("{} for {} epochs", cfg.arch, cfg.epochs);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TrainingConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects configurations no training run could use.
pub fn validate_config(config: &TrainingConfig) -> Result<(), ConfigError> {
    if config.lr.is_nan() || config.lr <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "lr must be positive, got {}",
            config.lr
        )));
    }

    if config.epochs == 0 {
        return Err(ConfigError::Invalid("epochs must be at least 1".to_string()));
    }

    if config.batchsize == 0 {
        return Err(ConfigError::Invalid(
            "batchsize must be at least 1".to_string(),
        ));
    }

    let increasing = config
        .lr_milestones
        .windows(2)
        .all(|pair| 0 < pair[0] && pair[0] < pair[1]);
    if !increasing {
        return Err(ConfigError::Invalid(format!(
            "lr_milestones must be strictly increasing, got {:?}",
            config.lr_milestones
        )));
    }

    Ok(())
}
