//! VGG-style CNN with 10 convolutions and 2 dense layers.

use crate::architectures::{INPUT_LENGTH, NUM_CLASSES};
use crate::error::GraphError;
use crate::graph::{Conv1D, GraphBuilder, Model, Shape, Tensor};
use crate::utils::Activation;

/// `(filters, convolutions)` per stage; every stage ends with a 4x max-pool.
const STAGES: [(usize, usize); 4] = [(64, 2), (128, 2), (256, 3), (512, 3)];

/// `depth` relu convolutions of kernel 3, without normalization.
pub(crate) fn conv_stack(
    g: &mut GraphBuilder,
    mut x: Tensor,
    filters: usize,
    depth: usize,
) -> Result<Tensor, GraphError> {
    for _ in 0..depth {
        x = g.conv1d(x, Conv1D::new(filters, 3))?;
        x = g.activation(x, Activation::Relu)?;
    }
    Ok(x)
}

pub fn build(mut g: GraphBuilder) -> Result<Model, GraphError> {
    let inputs = g.input(Shape::sequence(INPUT_LENGTH, 1));

    let mut x = inputs;
    for &(filters, depth) in STAGES.iter() {
        x = conv_stack(&mut g, x, filters, depth)?;
        x = g.max_pool1d(x, 4, 4)?;
    }

    let x = g.flatten(x)?;
    let x = g.dropout(x, 0.5)?;
    let x = g.dense(x, 450, Activation::Relu)?;
    let x = g.dropout(x, 0.5)?;
    let x = g.dense(x, NUM_CLASSES, Activation::Softmax)?;

    g.finish("VGG12", inputs, x)
}
