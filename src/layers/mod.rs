//! Layer abstractions for the model graph
//!
//! This module provides the Layer trait and the layer types the architecture
//! catalog is assembled from.

pub(crate) mod r#trait;
pub mod activation;
pub mod batchnorm;
pub mod conv1d;
pub mod dense;
pub mod dropout;
pub mod input;
pub mod merge;
pub mod pooling;
pub mod reshape;

// Re-export the Layer trait for convenience
pub use r#trait::Layer;
pub use activation::ActivationLayer;
pub use batchnorm::BatchNormLayer;
pub use conv1d::{Conv1DLayer, Padding};
pub use dense::DenseLayer;
pub use dropout::DropoutLayer;
pub use input::InputLayer;
pub use merge::{MergeLayer, MergeOp};
pub use pooling::{GlobalAveragePool1DLayer, MaxPool1DLayer, UpSampling1DLayer};
pub use reshape::{ReshapeLayer, TimeBorderLayer};
