//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer (also known as Linear or Fully Connected layer)
//! that performs the transformation: output = activation(input × weights + biases),
//! applied to the last axis of its input.

use crate::error::GraphError;
use crate::graph::Shape;
use crate::layers::r#trait::check_len;
use crate::layers::Layer;
use crate::utils::{Activation, Initializer};
use rand::rngs::StdRng;

/// Dense (fully connected) layer with weights, biases and a fused activation.
///
/// Performs y = f(xW + b) on every row of the last axis, where
/// W is the weight matrix (input_size × output_size)
/// and b is the bias vector (output_size).
///
/// # Fields
///
/// * `input_size` - Number of input features (last axis of the input)
/// * `output_size` - Number of output features
/// * `activation` - Activation applied after the affine transform
/// * `weights` - Weight matrix stored in row-major format (input_size × output_size)
/// * `biases` - Bias vector (output_size)
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    rows: usize,
    activation: Activation,
    weights: Vec<f32>,
    biases: Vec<f32>,
    output_shape: Shape,
}

impl DenseLayer {
    /// Create a new DenseLayer acting on the last axis of `input_shape`.
    ///
    /// Biases are initialized to zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `output_size` is zero.
    pub fn new(
        input_shape: &Shape,
        output_size: usize,
        activation: Activation,
        initializer: Initializer,
        rng: &mut StdRng,
    ) -> Result<Self, GraphError> {
        if output_size == 0 {
            return Err(GraphError::InvalidArgument {
                layer: "dense",
                reason: "units must be greater than 0".to_string(),
            });
        }
        let input_size = input_shape.last();
        let rows = input_shape.size() / input_size.max(1);

        let mut weights = vec![0.0f32; input_size * output_size];
        initializer.fill(&mut weights, input_size, output_size, rng);

        let mut dims = input_shape.dims().to_vec();
        if let Some(last) = dims.last_mut() {
            *last = output_size;
        }

        Ok(Self {
            input_size,
            output_size,
            rows,
            activation,
            weights,
            biases: vec![0.0f32; output_size],
            output_shape: Shape::new(dims),
        })
    }

    /// Get the input size of the layer.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get the output size of the layer.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Replace the weights and biases.
    ///
    /// # Panics
    ///
    /// Panics if either buffer has the wrong length.
    pub fn set_weights(&mut self, weights: Vec<f32>, biases: Vec<f32>) {
        check_len("weights", &weights, self.weights.len());
        check_len("biases", &biases, self.biases.len());
        self.weights = weights;
        self.biases = biases;
    }
}

impl Layer for DenseLayer {
    fn kind(&self) -> &'static str {
        "dense"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        let rows = batch_size * self.rows;
        check_len("input", inputs[0], rows * self.input_size);
        check_len("output", output, rows * self.output_size);

        for (x, y) in inputs[0]
            .chunks_exact(self.input_size)
            .zip(output.chunks_exact_mut(self.output_size))
        {
            y.copy_from_slice(&self.biases);
            for (i, &xv) in x.iter().enumerate() {
                if xv == 0.0 {
                    continue;
                }
                let w_row = &self.weights[i * self.output_size..(i + 1) * self.output_size];
                for (o, &w) in y.iter_mut().zip(w_row) {
                    *o += xv * w;
                }
            }
        }

        self.activation.apply(output, self.output_size);
    }

    /// Returns input_size × output_size (weights) + output_size (biases).
    fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}
