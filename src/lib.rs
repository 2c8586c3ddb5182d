//! One-dimensional CNN architectures for 3-class signal classification
//!
//! This library builds the RTA-CNN family of models for 9000-sample, single-lead
//! ECG recordings, together with the entropy-weighted loss and the command-line
//! parser used to configure training runs.
//!
//! # Modules
//!
//! - `graph`: Shapes, the functional graph builder and the resulting `Model`
//! - `layers`: Layer trait and implementations (Conv1D, BatchNorm, merges, etc.)
//! - `architectures`: RTA_CNN, WDCNN, VGG12, RESNET50, MSCNN and SENET
//! - `loss`: Entropy-weighted cross-entropy
//! - `cli`: Command-line arguments and value parsers
//! - `config`: Training configuration structures
//! - `utils`: Activation functions and weight initialisers

pub mod architectures;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod layers;
pub mod loss;
pub mod utils;

pub use architectures::{mscnn, resnet50, rta_cnn, senet, vgg12, wdcnn, Architecture};
pub use error::{ConfigError, GraphError};
pub use graph::{GraphBuilder, Model, Shape};
pub use loss::en_loss;
