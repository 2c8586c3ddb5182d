//! Merge layers joining two or more graph branches.
//!
//! - `Add`: element-wise sum, shapes must be identical
//! - `Multiply`: element-wise product with broadcasting over size-1 axes
//! - `Concatenate`: joins along the last (channel) axis

use crate::error::GraphError;
use crate::graph::Shape;
use crate::layers::r#trait::check_len;
use crate::layers::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOp {
    Add,
    Multiply,
    Concatenate,
}

impl MergeOp {
    fn kind(self) -> &'static str {
        match self {
            MergeOp::Add => "add",
            MergeOp::Multiply => "multiply",
            MergeOp::Concatenate => "concatenate",
        }
    }
}

/// A layer with several inputs and one output.
pub struct MergeLayer {
    op: MergeOp,
    input_shapes: Vec<Shape>,
    output_shape: Shape,
}

impl MergeLayer {
    /// Validates the input shapes for `op` and computes the merged shape.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for fewer than two inputs, `ShapeMismatch` for the first
    /// incompatible pair.
    pub fn new(op: MergeOp, input_shapes: Vec<Shape>) -> Result<Self, GraphError> {
        let layer = op.kind();
        if input_shapes.len() < 2 {
            return Err(GraphError::InvalidArgument {
                layer,
                reason: format!("needs at least 2 inputs, got {}", input_shapes.len()),
            });
        }

        let mismatch = |left: &Shape, right: &Shape| GraphError::ShapeMismatch {
            layer,
            left: left.clone(),
            right: right.clone(),
        };

        let first = &input_shapes[0];
        let output_shape = match op {
            MergeOp::Add => {
                if let Some(other) = input_shapes.iter().find(|s| *s != first) {
                    return Err(mismatch(first, other));
                }
                first.clone()
            }
            MergeOp::Multiply => {
                let mut merged = first.clone();
                for other in &input_shapes[1..] {
                    merged = merged.broadcast(other).ok_or_else(|| mismatch(&merged, other))?;
                }
                merged
            }
            MergeOp::Concatenate => {
                let rank = first.rank();
                let mut last = 0;
                for shape in &input_shapes {
                    let compatible = shape.rank() == rank
                        && rank > 0
                        && shape.dims()[..rank - 1] == first.dims()[..rank - 1];
                    if !compatible {
                        return Err(mismatch(first, shape));
                    }
                    last += shape.last();
                }
                let mut dims = first.dims().to_vec();
                dims[rank - 1] = last;
                Shape::new(dims)
            }
        };

        Ok(Self {
            op,
            input_shapes,
            output_shape,
        })
    }

    pub fn op(&self) -> MergeOp {
        self.op
    }

    pub fn input_shapes(&self) -> &[Shape] {
        &self.input_shapes
    }

    fn forward_add(&self, inputs: &[&[f32]], output: &mut [f32]) {
        output.copy_from_slice(inputs[0]);
        for input in &inputs[1..] {
            for (o, &v) in output.iter_mut().zip(input.iter()) {
                *o += v;
            }
        }
    }

    fn forward_multiply(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        output.fill(1.0);
        let out_dims = self.output_shape.dims();
        let out_size = self.output_shape.size();

        for (input, shape) in inputs.iter().zip(&self.input_shapes) {
            if shape == &self.output_shape {
                for (o, &v) in output.iter_mut().zip(input.iter()) {
                    *o *= v;
                }
                continue;
            }

            // row-major strides of the input, zeroed on broadcast axes
            let mut strides = vec![0usize; out_dims.len()];
            let mut acc = 1;
            for axis in (0..out_dims.len()).rev() {
                if shape.dims()[axis] != 1 {
                    strides[axis] = acc;
                }
                acc *= shape.dims()[axis];
            }
            let in_size = shape.size();

            for b in 0..batch_size {
                let x = &input[b * in_size..(b + 1) * in_size];
                let y = &mut output[b * out_size..(b + 1) * out_size];
                for (flat, o) in y.iter_mut().enumerate() {
                    let mut rem = flat;
                    let mut src = 0;
                    for axis in (0..out_dims.len()).rev() {
                        src += (rem % out_dims[axis]) * strides[axis];
                        rem /= out_dims[axis];
                    }
                    *o *= x[src];
                }
            }
        }
    }

    fn forward_concatenate(&self, inputs: &[&[f32]], output: &mut [f32]) {
        let out_last = self.output_shape.last();
        let mut offset = 0;
        for (input, shape) in inputs.iter().zip(&self.input_shapes) {
            let width = shape.last();
            for (src, dst) in input
                .chunks_exact(width)
                .zip(output.chunks_exact_mut(out_last))
            {
                dst[offset..offset + width].copy_from_slice(src);
            }
            offset += width;
        }
    }
}

impl Layer for MergeLayer {
    fn kind(&self) -> &'static str {
        self.op.kind()
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        assert_eq!(
            inputs.len(),
            self.input_shapes.len(),
            "{} expects {} inputs",
            self.op.kind(),
            self.input_shapes.len()
        );
        for (input, shape) in inputs.iter().zip(&self.input_shapes) {
            check_len("input", input, batch_size * shape.size());
        }
        check_len("output", output, batch_size * self.output_shape.size());

        match self.op {
            MergeOp::Add => self.forward_add(inputs, output),
            MergeOp::Multiply => self.forward_multiply(inputs, output, batch_size),
            MergeOp::Concatenate => self.forward_concatenate(inputs, output),
        }
    }
}
