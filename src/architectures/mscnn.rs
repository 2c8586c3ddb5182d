//! Multi-scale CNN: two identical VGG-like towers over the same input,
//! concatenated along channels.

use crate::architectures::vgg::conv_stack;
use crate::architectures::{INPUT_LENGTH, NUM_CLASSES};
use crate::error::GraphError;
use crate::graph::{GraphBuilder, Model, Shape, Tensor};
use crate::utils::Activation;

/// `(filters, convolutions, pool_stride)` per stage; pools are always of size 2.
const STAGES: [(usize, usize, usize); 5] = [
    (64, 2, 3),
    (128, 2, 3),
    (256, 3, 2),
    (512, 3, 2),
    (512, 3, 2),
];

fn tower(g: &mut GraphBuilder, inputs: Tensor) -> Result<Tensor, GraphError> {
    let mut x = inputs;
    for &(filters, depth, stride) in STAGES.iter() {
        x = conv_stack(g, x, filters, depth)?;
        x = g.max_pool1d(x, 2, stride)?;
    }
    Ok(x)
}

pub fn build(mut g: GraphBuilder) -> Result<Model, GraphError> {
    let inputs = g.input(Shape::sequence(INPUT_LENGTH, 1));

    let x1 = tower(&mut g, inputs)?;
    let x2 = tower(&mut g, inputs)?;
    let x = g.concatenate(&[x1, x2])?;

    let x = g.flatten(x)?;
    let x = g.dense(x, 256, Activation::Relu)?;
    let x = g.dense(x, NUM_CLASSES, Activation::Softmax)?;

    g.finish("MSCNN", inputs, x)
}
