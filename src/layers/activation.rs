//! Stand-alone activation layer.

use crate::graph::Shape;
use crate::layers::r#trait::check_len;
use crate::layers::Layer;
use crate::utils::Activation;

/// Applies an [`Activation`] element-wise (softmax: over the last axis).
pub struct ActivationLayer {
    activation: Activation,
    output_shape: Shape,
}

impl ActivationLayer {
    pub fn new(input_shape: &Shape, activation: Activation) -> Self {
        Self {
            activation,
            output_shape: input_shape.clone(),
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl Layer for ActivationLayer {
    fn kind(&self) -> &'static str {
        "activation"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        check_len("input", inputs[0], batch_size * self.output_shape.size());
        output.copy_from_slice(inputs[0]);
        self.activation.apply(output, self.output_shape.last());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_gate_in_unit_interval() {
        let layer = ActivationLayer::new(&Shape::sequence(3, 2), Activation::Sigmoid);
        let input = vec![-10.0, -1.0, 0.0, 1.0, 10.0, 100.0];
        let mut output = vec![0.0; 6];
        layer.forward(&[&input[..]], &mut output, 1);
        assert!(output.iter().all(|&g| (0.0..=1.0).contains(&g)));
        assert!((output[2] - 0.5).abs() < 1e-6);
    }
}
