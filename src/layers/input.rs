//! Graph input placeholder.

use crate::graph::Shape;
use crate::layers::r#trait::check_len;
use crate::layers::Layer;

/// Entry point of a graph; copies the caller's batch into the graph.
pub struct InputLayer {
    output_shape: Shape,
}

impl InputLayer {
    pub fn new(shape: Shape) -> Self {
        Self {
            output_shape: shape,
        }
    }
}

impl Layer for InputLayer {
    fn kind(&self) -> &'static str {
        "input"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        check_len("input", inputs[0], batch_size * self.output_shape.size());
        output.copy_from_slice(inputs[0]);
    }
}
