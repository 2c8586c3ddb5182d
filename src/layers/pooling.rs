//! Pooling and resampling along the time axis.
//!
//! - `MaxPool1DLayer`: windowed maximum, valid padding
//! - `UpSampling1DLayer`: repeats every step `size` times
//! - `GlobalAveragePool1DLayer`: mean over the whole sequence per channel

use crate::error::GraphError;
use crate::graph::Shape;
use crate::layers::r#trait::{check_len, sequence_dims};
use crate::layers::Layer;

/// Max pooling with `pool_size` windows every `stride` steps.
///
/// Output length is `floor((length - pool_size) / stride) + 1`; a trailing
/// partial window is dropped.
pub struct MaxPool1DLayer {
    pool_size: usize,
    stride: usize,
    input_length: usize,
    channels: usize,
    output_shape: Shape,
}

impl MaxPool1DLayer {
    pub fn new(input_shape: &Shape, pool_size: usize, stride: usize) -> Result<Self, GraphError> {
        let (input_length, channels) = sequence_dims("max_pool1d", input_shape)?;
        if pool_size == 0 || stride == 0 {
            return Err(GraphError::InvalidArgument {
                layer: "max_pool1d",
                reason: "pool_size and stride must be greater than 0".to_string(),
            });
        }
        if input_length < pool_size {
            return Err(GraphError::WindowTooLarge {
                layer: "max_pool1d",
                window: pool_size,
                length: input_length,
            });
        }
        let output_length = (input_length - pool_size) / stride + 1;

        Ok(Self {
            pool_size,
            stride,
            input_length,
            channels,
            output_shape: Shape::sequence(output_length, channels),
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl Layer for MaxPool1DLayer {
    fn kind(&self) -> &'static str {
        "max_pool1d"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        let in_size = self.input_length * self.channels;
        let out_size = self.output_shape.size();
        check_len("input", inputs[0], batch_size * in_size);
        check_len("output", output, batch_size * out_size);

        let ch = self.channels;
        for (x, y) in inputs[0]
            .chunks_exact(in_size)
            .zip(output.chunks_exact_mut(out_size))
        {
            for (t, row) in y.chunks_exact_mut(ch).enumerate() {
                let start = t * self.stride;
                row.copy_from_slice(&x[start * ch..(start + 1) * ch]);
                for p in start + 1..start + self.pool_size {
                    for (o, &v) in row.iter_mut().zip(&x[p * ch..(p + 1) * ch]) {
                        if v > *o {
                            *o = v;
                        }
                    }
                }
            }
        }
    }
}

/// Nearest-neighbour up-sampling: every step is repeated `size` times.
pub struct UpSampling1DLayer {
    size: usize,
    input_length: usize,
    channels: usize,
    output_shape: Shape,
}

impl UpSampling1DLayer {
    pub fn new(input_shape: &Shape, size: usize) -> Result<Self, GraphError> {
        let (input_length, channels) = sequence_dims("up_sampling1d", input_shape)?;
        if size == 0 {
            return Err(GraphError::InvalidArgument {
                layer: "up_sampling1d",
                reason: "size must be greater than 0".to_string(),
            });
        }
        Ok(Self {
            size,
            input_length,
            channels,
            output_shape: Shape::sequence(input_length * size, channels),
        })
    }
}

impl Layer for UpSampling1DLayer {
    fn kind(&self) -> &'static str {
        "up_sampling1d"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        let in_size = self.input_length * self.channels;
        check_len("input", inputs[0], batch_size * in_size);
        check_len("output", output, batch_size * in_size * self.size);

        let ch = self.channels;
        for (x_row, y_rows) in inputs[0]
            .chunks_exact(ch)
            .zip(output.chunks_exact_mut(ch * self.size))
        {
            for y_row in y_rows.chunks_exact_mut(ch) {
                y_row.copy_from_slice(x_row);
            }
        }
    }
}

/// Averages each channel over the sequence: `[length, channels] -> [channels]`.
pub struct GlobalAveragePool1DLayer {
    input_length: usize,
    channels: usize,
    output_shape: Shape,
}

impl GlobalAveragePool1DLayer {
    pub fn new(input_shape: &Shape) -> Result<Self, GraphError> {
        let (input_length, channels) = sequence_dims("global_average_pool1d", input_shape)?;
        Ok(Self {
            input_length,
            channels,
            output_shape: Shape::flat(channels),
        })
    }
}

impl Layer for GlobalAveragePool1DLayer {
    fn kind(&self) -> &'static str {
        "global_average_pool1d"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        let in_size = self.input_length * self.channels;
        check_len("input", inputs[0], batch_size * in_size);
        check_len("output", output, batch_size * self.channels);

        let inv_len = 1.0 / self.input_length.max(1) as f32;
        for (x, y) in inputs[0]
            .chunks_exact(in_size)
            .zip(output.chunks_exact_mut(self.channels))
        {
            y.fill(0.0);
            for row in x.chunks_exact(self.channels) {
                for (o, &v) in y.iter_mut().zip(row) {
                    *o += v;
                }
            }
            for o in y.iter_mut() {
                *o *= inv_len;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_pool_lengths() {
        let pool = MaxPool1DLayer::new(&Shape::sequence(2250, 32), 4, 4).unwrap();
        assert_eq!(pool.output_shape(), &Shape::sequence(562, 32));

        // stride larger than the window, as in the multi-scale towers
        let pool = MaxPool1DLayer::new(&Shape::sequence(9000, 64), 2, 3).unwrap();
        assert_eq!(pool.output_shape(), &Shape::sequence(3000, 64));

        // 3-wide window with stride 2 after the ResNet stem
        let pool = MaxPool1DLayer::new(&Shape::sequence(4497, 64), 3, 2).unwrap();
        assert_eq!(pool.output_shape(), &Shape::sequence(2248, 64));
    }

    #[test]
    fn test_max_pool_window_too_large() {
        let result = MaxPool1DLayer::new(&Shape::sequence(1, 4), 2, 2);
        assert!(matches!(result, Err(GraphError::WindowTooLarge { .. })));
    }

    #[test]
    fn test_max_pool_rank_error() {
        let result = MaxPool1DLayer::new(&Shape::flat(8), 2, 2);
        assert!(matches!(result, Err(GraphError::Rank { .. })));
    }

    #[test]
    fn test_max_pool_forward() {
        let pool = MaxPool1DLayer::new(&Shape::sequence(5, 2), 2, 2).unwrap();
        // channel 0: 1 5 2 0 9, channel 1: -1 -2 -3 -4 -5
        let input = vec![1.0, -1.0, 5.0, -2.0, 2.0, -3.0, 0.0, -4.0, 9.0, -5.0];
        let mut output = vec![0.0; 4];
        pool.forward(&[&input[..]], &mut output, 1);
        assert_eq!(output, vec![5.0, -1.0, 2.0, -3.0]);
    }

    #[test]
    fn test_up_sampling_forward() {
        let up = UpSampling1DLayer::new(&Shape::sequence(2, 1), 2).unwrap();
        assert_eq!(up.output_shape(), &Shape::sequence(4, 1));
        let mut output = vec![0.0; 4];
        let input = vec![3.0, 7.0];
        up.forward(&[&input[..]], &mut output, 1);
        assert_eq!(output, vec![3.0, 3.0, 7.0, 7.0]);
    }

    #[test]
    fn test_global_average_pool_forward() {
        let gap = GlobalAveragePool1DLayer::new(&Shape::sequence(4, 2)).unwrap();
        let input = vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 6.0, 60.0];
        let mut output = vec![0.0; 2];
        gap.forward(&[&input[..]], &mut output, 1);
        assert_eq!(output, vec![3.0, 30.0]);
    }
}
