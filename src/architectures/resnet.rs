//! 1-D ResNet-50 with bottleneck residual blocks.
//!
//! Every convolution uses He-normal initialisation. Stage strides are applied
//! by the first 1x1 convolution of each stage and by its projection shortcut.

use crate::architectures::{INPUT_LENGTH, NUM_CLASSES};
use crate::error::GraphError;
use crate::graph::{Conv1D, GraphBuilder, Model, Shape, Tensor};
use crate::layers::Padding;
use crate::utils::{Activation, Initializer};

const BASE_FILTERS: usize = 64;

/// `(width multiplier, stride, identity blocks)` for each stage.
const STAGES: [(usize, usize, usize); 4] = [(1, 4, 2), (2, 4, 3), (4, 2, 5), (8, 2, 2)];

fn he_conv(filters: usize, kernel_size: usize) -> Conv1D {
    Conv1D::new(filters, kernel_size).initializer(Initializer::HeNormal)
}

fn conv_bn(
    g: &mut GraphBuilder,
    x: Tensor,
    conv: Conv1D,
    relu: bool,
) -> Result<Tensor, GraphError> {
    let x = g.conv1d(x, conv)?;
    let x = g.batch_norm(x)?;
    if relu {
        g.activation(x, Activation::Relu)
    } else {
        Ok(x)
    }
}

/// Bottleneck block whose shortcut is the unchanged input.
///
/// The input must already have `filters[2]` channels.
pub fn identity_block(
    g: &mut GraphBuilder,
    x: Tensor,
    filters: [usize; 3],
) -> Result<Tensor, GraphError> {
    let [f1, f2, f3] = filters;
    let y = conv_bn(g, x, he_conv(f1, 1), true)?;
    let y = conv_bn(g, y, he_conv(f2, 3), true)?;
    let y = conv_bn(g, y, he_conv(f3, 1), false)?;

    let y = g.add(&[y, x])?;
    g.activation(y, Activation::Relu)
}

/// Bottleneck block with a strided 1x1 projection shortcut.
pub fn convolutional_block(
    g: &mut GraphBuilder,
    x: Tensor,
    filters: [usize; 3],
    stride: usize,
) -> Result<Tensor, GraphError> {
    let [f1, f2, f3] = filters;
    let y = conv_bn(g, x, he_conv(f1, 1).stride(stride), true)?;
    let y = conv_bn(g, y, he_conv(f2, 3), true)?;
    let y = conv_bn(g, y, he_conv(f3, 1), false)?;

    let shortcut = conv_bn(g, x, he_conv(f3, 1).stride(stride), false)?;

    let y = g.add(&[y, shortcut])?;
    g.activation(y, Activation::Relu)
}

pub fn build(mut g: GraphBuilder) -> Result<Model, GraphError> {
    let inputs = g.input(Shape::sequence(INPUT_LENGTH, 1));

    let stem = he_conv(BASE_FILTERS, 7).stride(2).padding(Padding::Valid);
    let x = conv_bn(&mut g, inputs, stem, true)?;
    let mut x = g.max_pool1d(x, 3, 2)?;

    for &(multiplier, stride, identities) in STAGES.iter() {
        let width = BASE_FILTERS * multiplier;
        let filters = [width, width, width * 4];
        x = convolutional_block(&mut g, x, filters, stride)?;
        for _ in 0..identities {
            x = identity_block(&mut g, x, filters)?;
        }
    }

    let x = g.global_average_pool1d(x)?;
    let x = g.dense_with(x, 500, Activation::Relu, Initializer::HeNormal)?;
    let x = g.dense(x, NUM_CLASSES, Activation::Softmax)?;

    g.finish("RESNET50", inputs, x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_block_needs_matching_channels() {
        let mut g = GraphBuilder::with_seed(0);
        let x = g.input(Shape::sequence(16, 8));
        assert!(matches!(
            identity_block(&mut g, x, [4, 4, 16]),
            Err(GraphError::ShapeMismatch { layer: "add", .. })
        ));
    }

    #[test]
    fn test_convolutional_block_strides_both_paths() {
        let mut g = GraphBuilder::with_seed(0);
        let x = g.input(Shape::sequence(2248, 64));
        let y = convolutional_block(&mut g, x, [64, 64, 256], 4).unwrap();
        assert_eq!(g.shape(y).unwrap(), &Shape::sequence(562, 256));
    }
}
