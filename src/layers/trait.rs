//! Layer trait definition for graph layers
//!
//! This module defines the core Layer trait that every node in a model graph
//! implements. The trait provides a common interface for forward propagation,
//! shape reporting and mode switching.

use crate::error::GraphError;
use crate::graph::Shape;

/// Core trait for neural network layers.
///
/// All layer types (Conv1D, Dense, pooling, merges, etc.) implement this trait so the
/// model can run them uniformly in topological order.
///
/// # Data layout
///
/// Layers work with flat f32 buffers laid out batch-major and channels-last:
/// a sequence batch is `batch_size × length × channels`.
///
/// # Example
///
/// ```ignore
/// // Forward pass through a single-input layer
/// let mut output = vec![0.0f32; batch_size * layer.output_shape().size()];
/// layer.forward(&[&input], &mut output, batch_size);
/// ```
pub trait Layer: Send {
    /// Short layer kind, e.g. `"conv1d"` or `"add"`.
    fn kind(&self) -> &'static str;

    /// Per-sample output shape, fixed at construction.
    fn output_shape(&self) -> &Shape;

    /// Forward propagation through the layer.
    ///
    /// # Arguments
    ///
    /// * `inputs` - One buffer per graph input of this node, each `batch_size × input_size`
    /// * `output` - Output buffer (`batch_size × output_shape().size()`)
    /// * `batch_size` - Number of samples in the batch
    ///
    /// # Panics
    ///
    /// Implementations panic if buffer lengths don't match the shapes the layer was built for.
    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize);

    /// Get the number of trainable parameters in the layer.
    fn parameter_count(&self) -> usize {
        0
    }

    /// Switch between training and inference behaviour.
    ///
    /// Only layers whose forward pass differs between modes (batch normalization,
    /// dropout) override this.
    fn set_training(&mut self, _training: bool) {}
}

/// Checks a forward-pass buffer length, panicking with a uniform message.
pub(crate) fn check_len(what: &str, buffer: &[f32], expected: usize) {
    assert_eq!(
        buffer.len(),
        expected,
        "{} len mismatch: expected {}, got {}",
        what,
        expected,
        buffer.len()
    );
}

/// Splits a rank-2 `[length, channels]` shape, or reports a rank error for `layer`.
pub(crate) fn sequence_dims(layer: &'static str, shape: &Shape) -> Result<(usize, usize), GraphError> {
    match shape.dims() {
        &[length, channels] => Ok((length, channels)),
        _ => Err(GraphError::Rank {
            layer,
            expected: 2,
            found: shape.clone(),
        }),
    }
}
