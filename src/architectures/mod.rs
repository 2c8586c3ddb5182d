//! Architecture catalog.
//!
//! Every builder takes a 9000-step single-channel signal and ends in a
//! 3-way softmax. The topology is fixed; only the weights depend on the seed.
//!
//! ```no_run
//! use rta_cnn::architectures::Architecture;
//!
//! let model = Architecture::Wdcnn.build_with_seed(42)?;
//! assert_eq!(model.output_shape().dims(), &[3]);
//! # Ok::<(), rta_cnn::GraphError>(())
//! ```

pub mod mscnn;
pub mod resnet;
pub mod rta_cnn;
pub mod senet;
pub mod vgg;
pub mod wdcnn;

use crate::error::GraphError;
use crate::graph::{Conv1D, GraphBuilder, Model, Tensor};
use crate::utils::Activation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of every input signal.
pub const INPUT_LENGTH: usize = 9000;
/// Number of output classes.
pub const NUM_CLASSES: usize = 3;

/// `(filters, kernel_size, pool)` stage schedule shared by RTA_CNN, WDCNN and SENET.
pub(crate) const STAGES: [(usize, usize, usize); 6] = [
    (16, 32, 4),
    (32, 16, 4),
    (64, 9, 2),
    (64, 9, 2),
    (128, 3, 2),
    (128, 3, 2),
];

/// Same-padded convolution, batch normalization and relu.
pub fn conv_block(
    g: &mut GraphBuilder,
    x: Tensor,
    filters: usize,
    kernel_size: usize,
) -> Result<Tensor, GraphError> {
    let x = g.conv1d(x, Conv1D::new(filters, kernel_size))?;
    let x = g.batch_norm(x)?;
    g.activation(x, Activation::Relu)
}

/// The six architectures, named as on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Architecture {
    #[default]
    #[serde(rename = "RTA_CNN")]
    #[value(name = "RTA_CNN")]
    RtaCnn,
    #[serde(rename = "VGG12")]
    #[value(name = "VGG12")]
    Vgg12,
    #[serde(rename = "RESNET50")]
    #[value(name = "RESNET50")]
    Resnet50,
    #[serde(rename = "MSCNN")]
    #[value(name = "MSCNN")]
    Mscnn,
    #[serde(rename = "SENET")]
    #[value(name = "SENET")]
    Senet,
    #[serde(rename = "WDCNN")]
    #[value(name = "WDCNN")]
    Wdcnn,
}

impl Architecture {
    pub const ALL: [Architecture; 6] = [
        Architecture::RtaCnn,
        Architecture::Vgg12,
        Architecture::Resnet50,
        Architecture::Mscnn,
        Architecture::Senet,
        Architecture::Wdcnn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Architecture::RtaCnn => "RTA_CNN",
            Architecture::Vgg12 => "VGG12",
            Architecture::Resnet50 => "RESNET50",
            Architecture::Mscnn => "MSCNN",
            Architecture::Senet => "SENET",
            Architecture::Wdcnn => "WDCNN",
        }
    }

    /// Builds the architecture with entropy-seeded weights.
    pub fn build(self) -> Result<Model, GraphError> {
        self.build_from(GraphBuilder::new())
    }

    /// Builds the architecture with weights determined by `seed`.
    pub fn build_with_seed(self, seed: u64) -> Result<Model, GraphError> {
        self.build_from(GraphBuilder::with_seed(seed))
    }

    fn build_from(self, g: GraphBuilder) -> Result<Model, GraphError> {
        match self {
            Architecture::RtaCnn => rta_cnn::build(g),
            Architecture::Vgg12 => vgg::build(g),
            Architecture::Resnet50 => resnet::build(g),
            Architecture::Mscnn => mscnn::build(g),
            Architecture::Senet => senet::build(g),
            Architecture::Wdcnn => wdcnn::build(g),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown architecture '{0}', expected one of: RTA_CNN | VGG12 | RESNET50 | MSCNN | SENET | WDCNN")]
pub struct UnknownArchitecture(pub String);

impl FromStr for Architecture {
    type Err = UnknownArchitecture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Architecture::ALL
            .into_iter()
            .find(|arch| arch.name() == s)
            .ok_or_else(|| UnknownArchitecture(s.to_string()))
    }
}

pub fn rta_cnn() -> Result<Model, GraphError> {
    Architecture::RtaCnn.build()
}

pub fn wdcnn() -> Result<Model, GraphError> {
    Architecture::Wdcnn.build()
}

pub fn vgg12() -> Result<Model, GraphError> {
    Architecture::Vgg12.build()
}

pub fn resnet50() -> Result<Model, GraphError> {
    Architecture::Resnet50.build()
}

pub fn mscnn() -> Result<Model, GraphError> {
    Architecture::Mscnn.build()
}

pub fn senet() -> Result<Model, GraphError> {
    Architecture::Senet.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for arch in Architecture::ALL {
            assert_eq!(arch.to_string().parse::<Architecture>(), Ok(arch));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            "FooBar".parse::<Architecture>(),
            Err(UnknownArchitecture("FooBar".to_string()))
        );
        // names are case sensitive
        assert!("rta_cnn".parse::<Architecture>().is_err());
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&Architecture::Resnet50).unwrap();
        assert_eq!(json, "\"RESNET50\"");
        let arch: Architecture = serde_json::from_str("\"RTA_CNN\"").unwrap();
        assert_eq!(arch, Architecture::RtaCnn);
    }
}
