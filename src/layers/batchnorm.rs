//! Batch normalization layer implementation
//!
//! This module provides a BatchNormLayer that normalizes each channel of its input,
//! the "normalize" step of every conv block.
//!
//! # Batch Normalization Theory
//!
//! Batch normalization normalizes the inputs to have zero mean and unit variance,
//! then applies learnable scale (gamma) and shift (beta) parameters:
//!
//! 1. Compute statistics per channel: mean μ and variance σ² across the batch and
//!    every position of the sequence
//! 2. Normalize: x_norm = (x - μ) / sqrt(σ² + ε)
//! 3. Scale and shift: y = γ * x_norm + β
//!
//! During training, batch normalization uses batch statistics and updates running statistics
//! via exponential moving average for use during inference. During inference, it uses the
//! accumulated running statistics instead of computing batch statistics.
//!
//! # References
//!
//! Ioffe, S., & Szegedy, C. (2015). Batch Normalization: Accelerating Deep Network Training
//! by Reducing Internal Covariate Shift. ICML.

use crate::graph::Shape;
use crate::layers::r#trait::check_len;
use crate::layers::Layer;
use std::cell::RefCell;

/// Default epsilon added to the variance.
pub const DEFAULT_EPSILON: f32 = 1e-3;
/// Default momentum of the running statistics.
pub const DEFAULT_MOMENTUM: f32 = 0.99;

/// Batch normalization over the last (channel) axis.
///
/// # Fields
///
/// * `channels` - Number of normalized channels (last axis of the input)
/// * `positions` - Values per channel in one sample (sequence length, or 1 for flat inputs)
/// * `epsilon` - Small constant for numerical stability (prevents division by zero)
/// * `momentum` - Momentum for updating running statistics
/// * `training` - Whether the layer is in training mode (true) or inference mode (false)
/// * `gamma` - Learnable scale parameter (initialized to 1.0)
/// * `beta` - Learnable shift parameter (initialized to 0.0)
/// * `running_mean` - Running average of means (initialized to 0.0)
/// * `running_var` - Running average of variances (initialized to 1.0)
pub struct BatchNormLayer {
    channels: usize,
    positions: usize,
    epsilon: f32,
    momentum: f32,
    training: bool,

    // Learnable parameters
    gamma: Vec<f32>,
    beta: Vec<f32>,

    // Running statistics (updated during training, used during inference)
    // RefCell needed for interior mutability during forward pass
    running_mean: RefCell<Vec<f32>>,
    running_var: RefCell<Vec<f32>>,

    output_shape: Shape,
}

impl BatchNormLayer {
    /// Creates a batch normalization layer for inputs of `input_shape`.
    ///
    /// The layer starts in inference mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use rta_cnn::graph::Shape;
    /// use rta_cnn::layers::BatchNormLayer;
    /// let layer = BatchNormLayer::new(&Shape::sequence(9000, 16), 1e-3, 0.99);
    /// assert_eq!(layer.channels(), 16);
    /// assert!(!layer.is_training());
    /// ```
    pub fn new(input_shape: &Shape, epsilon: f32, momentum: f32) -> Self {
        assert!(epsilon > 0.0, "epsilon must be positive");
        assert!(
            (0.0..=1.0).contains(&momentum),
            "momentum must be in range [0.0, 1.0]"
        );
        let channels = input_shape.last();

        Self {
            channels,
            positions: input_shape.size() / channels.max(1),
            epsilon,
            momentum,
            training: false,
            gamma: vec![1.0f32; channels],
            beta: vec![0.0f32; channels],
            running_mean: RefCell::new(vec![0.0f32; channels]),
            running_var: RefCell::new(vec![1.0f32; channels]),
            output_shape: input_shape.clone(),
        }
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn gamma(&self) -> &[f32] {
        &self.gamma
    }

    pub fn beta(&self) -> &[f32] {
        &self.beta
    }

    /// Get a copy of the running mean statistics.
    pub fn running_mean(&self) -> Vec<f32> {
        self.running_mean.borrow().clone()
    }

    /// Get a copy of the running variance statistics.
    pub fn running_var(&self) -> Vec<f32> {
        self.running_var.borrow().clone()
    }

    fn normalize(&self, input: &[f32], output: &mut [f32], mean: &[f32], var: &[f32]) {
        let scale: Vec<f32> = (0..self.channels)
            .map(|c| self.gamma[c] / (var[c] + self.epsilon).sqrt())
            .collect();
        for (x_row, y_row) in input
            .chunks_exact(self.channels)
            .zip(output.chunks_exact_mut(self.channels))
        {
            for c in 0..self.channels {
                y_row[c] = (x_row[c] - mean[c]) * scale[c] + self.beta[c];
            }
        }
    }
}

impl Layer for BatchNormLayer {
    fn kind(&self) -> &'static str {
        "batch_norm"
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    /// During training mode, computes per-channel statistics over the batch and all
    /// positions, normalizes with them and updates the running statistics.
    /// During inference mode, uses the running statistics.
    fn forward(&self, inputs: &[&[f32]], output: &mut [f32], batch_size: usize) {
        let input = inputs[0];
        let total_size = batch_size * self.positions * self.channels;
        check_len("input", input, total_size);
        check_len("output", output, total_size);

        if !self.training {
            let running_mean = self.running_mean.borrow();
            let running_var = self.running_var.borrow();
            self.normalize(input, output, &running_mean, &running_var);
            return;
        }

        let count = (batch_size * self.positions).max(1) as f32;
        let mut batch_mean = vec![0.0f32; self.channels];
        let mut batch_var = vec![0.0f32; self.channels];

        for row in input.chunks_exact(self.channels) {
            for (m, &x) in batch_mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for mean in &mut batch_mean {
            *mean /= count;
        }

        for row in input.chunks_exact(self.channels) {
            for c in 0..self.channels {
                let diff = row[c] - batch_mean[c];
                batch_var[c] += diff * diff;
            }
        }
        for var in &mut batch_var {
            *var /= count;
        }

        self.normalize(input, output, &batch_mean, &batch_var);

        // running = momentum * running + (1 - momentum) * batch
        let mut running_mean = self.running_mean.borrow_mut();
        let mut running_var = self.running_var.borrow_mut();
        for c in 0..self.channels {
            running_mean[c] = self.momentum * running_mean[c] + (1.0 - self.momentum) * batch_mean[c];
            running_var[c] = self.momentum * running_var[c] + (1.0 - self.momentum) * batch_var[c];
        }
    }

    /// Returns 2 × channels (gamma and beta).
    fn parameter_count(&self) -> usize {
        self.gamma.len() + self.beta.len()
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }
}
