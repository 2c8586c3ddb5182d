//! Squeeze-and-excitation CNN.

use crate::architectures::{conv_block, INPUT_LENGTH, NUM_CLASSES, STAGES};
use crate::error::GraphError;
use crate::graph::{GraphBuilder, Model, Shape, Tensor};
use crate::utils::Activation;

/// Rescales each channel of `x` by a gate computed from its global average,
/// then adds the result back onto `x`.
pub fn se_block(g: &mut GraphBuilder, x: Tensor, filters: usize) -> Result<Tensor, GraphError> {
    let squeeze = g.global_average_pool1d(x)?;
    let excitation = g.dense(squeeze, filters / 2, Activation::Relu)?;
    let excitation = g.dense(excitation, filters, Activation::Sigmoid)?;
    let excitation = g.reshape(excitation, Shape::sequence(1, filters))?;
    let scale = g.multiply(&[x, excitation])?;
    g.add(&[x, scale])
}

pub fn build(mut g: GraphBuilder) -> Result<Model, GraphError> {
    let inputs = g.input(Shape::sequence(INPUT_LENGTH, 1));

    let mut x = inputs;
    for &(filters, kernel_size, pool) in STAGES.iter() {
        x = conv_block(&mut g, x, filters, kernel_size)?;
        x = se_block(&mut g, x, filters)?;
        x = g.max_pool1d(x, pool, pool)?;
    }

    let x = g.flatten(x)?;
    let x = g.dense(x, 300, Activation::Relu)?;
    let x = g.dense(x, NUM_CLASSES, Activation::Softmax)?;

    g.finish("SENET", inputs, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_se_block_output_between_one_and_two_times_input() {
        let mut g = GraphBuilder::with_seed(9);
        let x = g.input(Shape::sequence(6, 4));
        let y = se_block(&mut g, x, 4).unwrap();
        let model = g.finish("se", x, y).unwrap();

        let input: Vec<f32> = (0..24).map(|i| i as f32 * 0.1).collect();
        let output = model.predict(&input, 1).unwrap();
        for (&x, &y) in input.iter().zip(&output) {
            // y = x * (1 + gate), gate in [0, 1]
            assert!(y >= x - 1e-6 && y <= 2.0 * x + 1e-6);
        }
        assert_abs_diff_eq!(output[0], 0.0);
    }
}
