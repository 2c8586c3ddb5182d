//! Command-line interface.
//!
//! Flags mirror the training configuration. [`parse_dict_args`] turns keyword
//! pairs into the equivalent flag list and parses it with the same parser.

use crate::architectures::Architecture;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "af_detect", version, about = "RTA-CNN for AF Detection")]
pub struct Args {
    /// Select the folder for validation
    #[arg(long, value_name = "N")]
    pub experiment_index: Option<i64>,

    /// Model architecture
    #[arg(short, long, value_name = "ARCH", value_enum, default_value_t = Architecture::RtaCnn)]
    pub arch: Architecture,

    /// Number of total epochs to run
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub epochs: usize,

    /// Mini-batch size
    #[arg(long, value_name = "N", default_value_t = 48)]
    pub batchsize: usize,

    /// Max learning rate
    #[arg(long, value_name = "LR", default_value_t = 1e-4)]
    pub lr: f64,

    /// Comma-separated epochs at which the learning rate drops
    // fully qualified so clap takes the whole list as a single value
    #[arg(long, value_name = "EPOCHS", value_parser = parse_epoch_list, default_value = "")]
    pub lr_milestones: ::std::vec::Vec<usize>,

    /// Print the model summary
    #[arg(
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        value_parser = parse_bool,
        default_value = "true"
    )]
    pub summary: bool,

    /// Weight initialisation seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// JSON training config replacing the flags above
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter directive; falls back to RUST_LOG, then `info`
    #[arg(long, value_name = "LEVEL")]
    pub log: Option<String>,
}

/// Picks the log filter directive: the `--log` flag wins over `RUST_LOG`, and
/// `info` applies when neither is set.
pub fn log_directive(flag: Option<&str>, env: Option<&str>) -> String {
    flag.or(env).unwrap_or("info").to_string()
}

/// Builds the subscriber filter for `args`, reading `RUST_LOG` when `--log` is absent.
pub fn log_filter(args: &Args) -> EnvFilter {
    let env = std::env::var("RUST_LOG").ok();
    EnvFilter::new(log_directive(args.log.as_deref(), env.as_deref()))
}

/// Converts one keyword pair into its flag form.
///
/// Single-character keys become `-k`; longer keys become `--key` with
/// underscores replaced by dashes.
pub fn to_cmdline_kwarg(key: &str, value: impl ToString) -> (String, String) {
    let key = if key.chars().count() == 1 {
        format!("-{}", key)
    } else {
        format!("--{}", key.replace('_', "-"))
    };
    (key, value.to_string())
}

/// Parses keyword pairs as if they had been given on the command line.
///
/// # Examples
///
/// ```
/// use rta_cnn::cli::parse_dict_args;
///
/// let args = parse_dict_args([("a", "VGG12"), ("experiment_index", "2")]).unwrap();
/// assert_eq!(args.arch.to_string(), "VGG12");
/// assert_eq!(args.experiment_index, Some(2));
/// ```
pub fn parse_dict_args<I, K, V>(kwargs: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: ToString,
{
    let mut argv = vec!["af_detect".to_string()];
    for (key, value) in kwargs {
        let (flag, value) = to_cmdline_kwarg(key.as_ref(), value);
        argv.push(flag);
        argv.push(value);
    }
    Args::try_parse_from(argv)
}

/// Parses a yes/no style boolean, case-insensitively.
pub fn parse_bool(v: &str) -> Result<bool, String> {
    match v.to_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err("Boolean value expected.".to_string()),
    }
}

/// Parses a comma-separated, strictly increasing list of positive epochs.
///
/// The empty string is the empty list.
pub fn parse_epoch_list(v: &str) -> Result<Vec<usize>, String> {
    if v.is_empty() {
        return Ok(Vec::new());
    }
    let epochs = v
        .split(',')
        .map(|s| s.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("Expected comma-separated list of integers, got \"{}\"", v))?;

    if !epochs.windows(2).all(|pair| 0 < pair[0] && pair[0] < pair[1]) {
        return Err("Expected the epochs to be listed in increasing order".to_string());
    }
    Ok(epochs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kwarg_keys() {
        assert_eq!(to_cmdline_kwarg("a", "SENET"), ("-a".to_string(), "SENET".to_string()));
        assert_eq!(
            to_cmdline_kwarg("experiment_index", 4),
            ("--experiment-index".to_string(), "4".to_string())
        );
    }

    #[test]
    fn test_epoch_list_errors() {
        assert_eq!(
            parse_epoch_list("5,3"),
            Err("Expected the epochs to be listed in increasing order".to_string())
        );
        assert_eq!(
            parse_epoch_list("5,x"),
            Err("Expected comma-separated list of integers, got \"5,x\"".to_string())
        );
    }

    #[test]
    fn test_bool_rejects_other_words() {
        assert!(parse_bool("maybe").is_err());
        assert_eq!(parse_bool("YES"), Ok(true));
    }
}
