//! Plain deep CNN: six conv-BN-relu-pool stages and a small dense head.

use crate::architectures::{conv_block, INPUT_LENGTH, NUM_CLASSES, STAGES};
use crate::error::GraphError;
use crate::graph::{GraphBuilder, Model, Shape};
use crate::utils::Activation;

pub fn build(mut g: GraphBuilder) -> Result<Model, GraphError> {
    let inputs = g.input(Shape::sequence(INPUT_LENGTH, 1));

    let mut x = inputs;
    for &(filters, kernel_size, pool) in STAGES.iter() {
        x = conv_block(&mut g, x, filters, kernel_size)?;
        x = g.max_pool1d(x, pool, pool)?;
    }

    let x = g.flatten(x)?;
    let x = g.dense(x, 100, Activation::Relu)?;
    let x = g.dense(x, NUM_CLASSES, Activation::Softmax)?;

    g.finish("WDCNN", inputs, x)
}
