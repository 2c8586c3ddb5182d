//! Dropout layer implementation for regularization
//!
//! This module provides a DropoutLayer that randomly drops (sets to zero) a fraction
//! of input units during training to prevent overfitting. During inference, all units
//! are kept and outputs are passed through unchanged.

use crate::error::GraphError;
use crate::graph::Shape;
use crate::layers::r#trait::check_len;
use crate::layers::Layer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;

/// Dropout layer for regularization.
///
/// During training, randomly sets a fraction of input units to zero with probability
/// `drop_rate`, and scales the remaining units by 1/(1-drop_rate) to maintain expected
/// values. During inference, passes inputs through unchanged.
///
/// # Fields
///
/// * `drop_rate` - Probability of dropping each unit (0.0 = no dropout)
/// * `training` - Whether the layer is in training mode (true) or inference mode (false)
/// * `rng` - Random number generator for dropout mask generation
pub struct DropoutLayer {
    drop_rate: f32,
    training: bool,
    rng: RefCell<StdRng>,
    output_shape: Shape,
}

impl DropoutLayer {
    /// Creates a new dropout layer with specified drop rate, in inference mode.
    ///
    /// The layer's own mask generator is seeded from `rng`, so seeded graphs
    /// drop the same units on every run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `drop_rate` is outside `[0.0, 1.0)`.
    pub fn new(input_shape: &Shape, drop_rate: f32, rng: &mut StdRng) -> Result<Self, GraphError> {
        if !(0.0..1.0).contains(&drop_rate) {
            return Err(GraphError::InvalidArgument {
                layer: "dropout",
                reason: format!("drop_rate must be in range [0.0, 1.0), got {}", drop_rate),
            });
        }

        Ok(Self {
            drop_rate,
            training: false,
            rng: RefCell::new(StdRng::seed_from_u64(rng.gen())),
            output_shape: input_shape.clone(),
        })
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// The probability that each unit will be dropped during training.
    pub fn drop_rate(&self) -> f32 {
        self.drop_rate
    }
}

impl Layer for DropoutLayer {
    fn kind(&self) -> &'static str {
        "dropout"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        let input = inputs[0];
        let total_size = batch_size * self.output_shape.size();
        check_len("input", input, total_size);
        check_len("output", output, total_size);

        if !self.training {
            // Inference mode: pass through unchanged
            output.copy_from_slice(input);
            return;
        }

        let scale = 1.0 / (1.0 - self.drop_rate);
        let mut rng = self.rng.borrow_mut();
        for (o, &x) in output.iter_mut().zip(input) {
            *o = if rng.gen::<f32>() >= self.drop_rate {
                x * scale
            } else {
                0.0
            };
        }
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }
}
