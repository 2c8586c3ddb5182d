//! Error types for graph construction, prediction and configuration.

use crate::graph::Shape;
use thiserror::Error;

/// Errors raised while assembling or running a layer graph.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// A layer received an input of the wrong rank.
    #[error("{layer}: expected a rank-{expected} input, got {found}")]
    Rank {
        layer: &'static str,
        expected: usize,
        found: Shape,
    },

    /// Inputs to a merge layer (or a reshape target) do not line up.
    #[error("{layer}: incompatible shapes {left} and {right}")]
    ShapeMismatch {
        layer: &'static str,
        left: Shape,
        right: Shape,
    },

    /// A pooling, convolution or cropping window does not fit in the sequence.
    #[error("{layer}: window of {window} does not fit a sequence of length {length}")]
    WindowTooLarge {
        layer: &'static str,
        window: usize,
        length: usize,
    },

    /// A layer hyperparameter is out of range.
    #[error("{layer}: {reason}")]
    InvalidArgument { layer: &'static str, reason: String },

    /// A tensor handle that does not belong to this graph.
    #[error("unknown tensor #{0}")]
    UnknownTensor(usize),

    /// The designated model input is not an input node.
    #[error("tensor #{0} is not a graph input")]
    NotAnInput(usize),

    /// Prediction input does not match `batch_size * input_size`.
    #[error("input buffer holds {found} values, expected {expected}")]
    InputSize { expected: usize, found: usize },
}

/// Errors raised while loading or validating a training configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
