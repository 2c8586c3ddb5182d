//! Shape-only layers: flatten, reshape, and zero-padding / cropping along time.

use crate::error::GraphError;
use crate::graph::Shape;
use crate::layers::r#trait::{check_len, sequence_dims};
use crate::layers::Layer;

/// Passes data through unchanged under a new shape.
///
/// Both `Flatten` and `Reshape` are this layer; the buffers are row-major so
/// only the logical shape changes.
pub struct ReshapeLayer {
    kind: &'static str,
    input_size: usize,
    output_shape: Shape,
}

impl ReshapeLayer {
    /// Collapses all axes into one: `[length, channels] -> [length * channels]`.
    pub fn flatten(input_shape: &Shape) -> Self {
        Self {
            kind: "flatten",
            input_size: input_shape.size(),
            output_shape: Shape::flat(input_shape.size()),
        }
    }

    /// Reinterprets the input under `target`, which must hold the same number of values.
    pub fn reshape(input_shape: &Shape, target: Shape) -> Result<Self, GraphError> {
        if input_shape.size() != target.size() {
            return Err(GraphError::ShapeMismatch {
                layer: "reshape",
                left: input_shape.clone(),
                right: target,
            });
        }
        Ok(Self {
            kind: "reshape",
            input_size: input_shape.size(),
            output_shape: target,
        })
    }
}

impl Layer for ReshapeLayer {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        check_len("input", inputs[0], batch_size * self.input_size);
        output.copy_from_slice(inputs[0]);
    }
}

/// Adds (`ZeroPadding1D`) or removes (`Cropping1D`) steps at both ends of the time axis.
pub struct TimeBorderLayer {
    kind: &'static str,
    input_length: usize,
    channels: usize,
    // offset of the first kept input step, and of its destination in the output
    src_start: usize,
    dst_start: usize,
    copied: usize,
    output_shape: Shape,
}

impl TimeBorderLayer {
    /// Prepends `left` and appends `right` zero steps.
    pub fn zero_padding(input_shape: &Shape, left: usize, right: usize) -> Result<Self, GraphError> {
        let (input_length, channels) = sequence_dims("zero_padding1d", input_shape)?;
        Ok(Self {
            kind: "zero_padding1d",
            input_length,
            channels,
            src_start: 0,
            dst_start: left,
            copied: input_length,
            output_shape: Shape::sequence(input_length + left + right, channels),
        })
    }

    /// Drops `left` leading and `right` trailing steps.
    pub fn cropping(input_shape: &Shape, left: usize, right: usize) -> Result<Self, GraphError> {
        let (input_length, channels) = sequence_dims("cropping1d", input_shape)?;
        if left + right >= input_length {
            return Err(GraphError::WindowTooLarge {
                layer: "cropping1d",
                window: left + right,
                length: input_length,
            });
        }
        let copied = input_length - left - right;
        Ok(Self {
            kind: "cropping1d",
            input_length,
            channels,
            src_start: left,
            dst_start: 0,
            copied,
            output_shape: Shape::sequence(copied, channels),
        })
    }
}

impl Layer for TimeBorderLayer {
    fn kind(&self) -> &'static str {
        self.kind
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
            y.fill(0.0);
            let src = &x[self.src_start * ch..(self.src_start + self.copied) * ch];
            y[self.dst_start * ch..(self.dst_start + self.copied) * ch].copy_from_slice(src);
        }
    }
}
