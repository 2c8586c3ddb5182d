//! 1D Convolutional layer implementation
//!
//! This module provides a Conv1DLayer that slides learnable filters along the
//! time axis of a `[length, channels]` signal, the building block of every
//! architecture in the catalog.

use crate::error::GraphError;
use crate::graph::Shape;
use crate::layers::r#trait::check_len;
use crate::layers::Layer;
use crate::utils::Initializer;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Border handling for convolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Output length `ceil(length / stride)`, zero-padded as evenly as possible
    /// with the extra element on the right.
    Same,
    /// No padding, output length `floor((length - kernel) / stride) + 1`.
    Valid,
}

/// Computes `(output_length, left_padding)` for a convolution window.
///
/// Returns `None` when a `Valid` window is longer than the input.
pub fn conv_output_length(
    length: usize,
    kernel_size: usize,
    stride: usize,
    padding: Padding,
) -> Option<(usize, usize)> {
    match padding {
        Padding::Same => {
            let out = length.div_ceil(stride);
            let needed = (out.saturating_sub(1) * stride + kernel_size).saturating_sub(length);
            Some((out, needed / 2))
        }
        Padding::Valid => {
            if length < kernel_size {
                None
            } else {
                Some(((length - kernel_size) / stride + 1, 0))
            }
        }
    }
}

/// 1D Convolutional layer with learnable filters.
///
/// # Fields
///
/// * `in_channels` - Channels of the input signal
/// * `filters` - Number of output feature maps
/// * `kernel_size` - Width of each filter along the time axis
/// * `stride` - Step between consecutive windows
/// * `padding` - Border handling (`Same` or `Valid`)
/// * `weights` - Filters laid out `kernel_size × in_channels × filters`
/// * `biases` - Bias for each output channel (filters)
///
/// # Example
///
/// ```ignore
/// use rand::{rngs::StdRng, SeedableRng};
/// use rta_cnn::layers::{Conv1DLayer, Padding};
/// use rta_cnn::utils::Initializer;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let layer = Conv1DLayer::new(9000, 1, 16, 32, 1, Padding::Same, Initializer::GlorotUniform, &mut rng)?;
/// assert_eq!(layer.output_length(), 9000);
/// ```
pub struct Conv1DLayer {
    input_length: usize,
    in_channels: usize,
    filters: usize,
    kernel_size: usize,
    stride: usize,
    padding: Padding,
    output_length: usize,
    pad_left: usize,
    weights: Vec<f32>, // [kernel_size * in_channels * filters]
    biases: Vec<f32>,  // [filters]
    output_shape: Shape,
}

impl Conv1DLayer {
    /// Create a new Conv1DLayer with the given kernel initialisation.
    ///
    /// For convolutions: fan_in = kernel_size × in_channels, fan_out = kernel_size × filters.
    /// Biases are initialized to zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for zero filters, kernel or stride, and
    /// `WindowTooLarge` when a `Valid` kernel does not fit the input.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        input_length: usize,
        in_channels: usize,
        filters: usize,
        kernel_size: usize,
        stride: usize,
        padding: Padding,
        initializer: Initializer,
        rng: &mut StdRng,
    ) -> Result<Self, GraphError> {
        if filters == 0 || kernel_size == 0 || stride == 0 {
            return Err(GraphError::InvalidArgument {
                layer: "conv1d",
                reason: format!(
                    "filters ({}), kernel_size ({}) and stride ({}) must be greater than 0",
                    filters, kernel_size, stride
                ),
            });
        }
        let (output_length, pad_left) =
            conv_output_length(input_length, kernel_size, stride, padding).ok_or(
                GraphError::WindowTooLarge {
                    layer: "conv1d",
                    window: kernel_size,
                    length: input_length,
                },
            )?;

        let weight_count = kernel_size * in_channels * filters;
        let mut weights = vec![0.0f32; weight_count];
        initializer.fill(
            &mut weights,
            kernel_size * in_channels,
            kernel_size * filters,
            rng,
        );

        Ok(Self {
            input_length,
            in_channels,
            filters,
            kernel_size,
            stride,
            padding,
            output_length,
            pad_left,
            weights,
            biases: vec![0.0f32; filters],
            output_shape: Shape::sequence(output_length, filters),
        })
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn filters(&self) -> usize {
        self.filters
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn input_length(&self) -> usize {
        self.input_length
    }

    pub fn output_length(&self) -> usize {
        self.output_length
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    /// Replace the filters and biases, e.g. with trained values.
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

impl Layer for Conv1DLayer {
    fn kind(&self) -> &'static str {
        "conv1d"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        let in_size = self.input_length * self.in_channels;
        let out_size = self.output_length * self.filters;
        check_len("input", inputs[0], batch_size * in_size);
        check_len("output", output, batch_size * out_size);

        let in_ch = self.in_channels;
        let filters = self.filters;

        for (x, y) in inputs[0]
            .chunks_exact(in_size)
            .zip(output.chunks_exact_mut(out_size))
        {
            y.par_chunks_mut(filters).enumerate().for_each(|(t, row)| {
                row.copy_from_slice(&self.biases);
                let start = (t * self.stride) as isize - self.pad_left as isize;
                for k in 0..self.kernel_size {
                    let pos = start + k as isize;
                    if pos < 0 || pos >= self.input_length as isize {
                        continue; // zero padding
                    }
                    let pos = pos as usize;
                    let x_row = &x[pos * in_ch..(pos + 1) * in_ch];
                    let w_k = &self.weights[k * in_ch * filters..(k + 1) * in_ch * filters];
                    for (c, &xv) in x_row.iter().enumerate() {
                        if xv == 0.0 {
                            continue;
                        }
                        let w_row = &w_k[c * filters..(c + 1) * filters];
                        for (o, &w) in row.iter_mut().zip(w_row) {
                            *o += xv * w;
                        }
                    }
                }
            });
        }
    }

    fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}
