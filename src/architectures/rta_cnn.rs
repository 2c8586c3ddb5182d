//! Residual-attention CNN.
//!
//! Six RTA blocks, each combining a two-conv trunk with a soft-attention branch
//! that gates the trunk per position and channel.

use crate::architectures::{conv_block, INPUT_LENGTH, NUM_CLASSES, STAGES};
use crate::error::GraphError;
use crate::graph::{Conv1D, GraphBuilder, Model, Shape, Tensor};
use crate::utils::Activation;

/// Hourglass branch producing a sigmoid gate with the shape of `x`.
///
/// Pooling then up-sampling an odd length loses one step; the branch pads one
/// step on each side and crops one from the left to line the two paths up again.
pub fn attention_branch(
    g: &mut GraphBuilder,
    x: Tensor,
    filters: usize,
    kernel_size: usize,
) -> Result<Tensor, GraphError> {
    let x1 = conv_block(g, x, filters, kernel_size)?;

    let down = g.max_pool1d(x1, 2, 2)?;
    let down = conv_block(g, down, filters, kernel_size)?;
    let up = g.up_sampling1d(down, 2)?;

    let mut x2 = conv_block(g, up, filters, kernel_size)?;
    if g.shape(x1)? != g.shape(x2)? {
        x2 = g.zero_padding1d(x2, 1, 1)?;
        x2 = g.cropping1d(x2, 1, 0)?;
    }

    let merged = g.add(&[x1, x2])?;
    let merged = conv_block(g, merged, filters, kernel_size)?;

    let gate = g.conv1d(merged, Conv1D::new(filters, 1))?;
    let gate = g.batch_norm(gate)?;
    g.activation(gate, Activation::Sigmoid)
}

/// `conv_block(gate(x1) * conv_block(x1) + x1)` with `x1 = conv_block(x)`.
pub fn rta_block(
    g: &mut GraphBuilder,
    x: Tensor,
    filters: usize,
    kernel_size: usize,
) -> Result<Tensor, GraphError> {
    let x1 = conv_block(g, x, filters, kernel_size)?;
    let x2 = conv_block(g, x1, filters, kernel_size)?;

    let attention = attention_branch(g, x1, filters, kernel_size)?;

    let gated = g.multiply(&[x2, attention])?;
    let residual = g.add(&[gated, x1])?;
    conv_block(g, residual, filters, kernel_size)
}

pub fn build(mut g: GraphBuilder) -> Result<Model, GraphError> {
    let inputs = g.input(Shape::sequence(INPUT_LENGTH, 1));

    let mut x = inputs;
    for (i, &(filters, kernel_size, pool)) in STAGES.iter().enumerate() {
        x = rta_block(&mut g, x, filters, kernel_size)?;
        x = g.max_pool1d(x, pool, pool)?;
        if i == 3 || i == 5 {
            x = g.dropout(x, 0.6)?;
        }
    }

    let x = g.flatten(x)?;
    let x = g.dropout(x, 0.7)?;
    let x = g.dense(x, 100, Activation::Relu)?;
    let x = g.dropout(x, 0.7)?;
    let x = g.dense(x, NUM_CLASSES, Activation::Softmax)?;

    g.finish("RTA_CNN", inputs, x)
}
