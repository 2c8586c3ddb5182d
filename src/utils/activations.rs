//! Activation functions for neural networks
//!
//! This module provides the element-wise and row-wise activations used by the
//! architectures:
//! - ReLU (hidden layers)
//! - Sigmoid (attention and excitation gates)
//! - Softmax (output layers)

use std::fmt;

/// Activation applied by an `Activation` layer or fused into a `Dense` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    /// Softmax over the last axis.
    Softmax,
}

impl Activation {
    /// Applies the activation in-place to rows of `cols` values.
    pub fn apply(self, data: &mut [f32], cols: usize) {
        match self {
            Activation::Linear => {}
            Activation::Relu => relu_inplace(data),
            Activation::Sigmoid => sigmoid_inplace(data),
            Activation::Softmax => softmax_rows(data, data.len() / cols.max(1), cols),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Linear => "linear",
            Activation::Relu => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Softmax => "softmax",
        };
        f.write_str(name)
    }
}

/// Sigmoid activation function: 1 / (1 + exp(-x))
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid applied in-place.
pub fn sigmoid_inplace(data: &mut [f32]) {
    for value in data.iter_mut() {
        *value = sigmoid(*value);
    }
}

/// ReLU activation function applied in-place.
///
/// Sets all negative values to 0.0, keeps positive values unchanged.
pub fn relu_inplace(data: &mut [f32]) {
    for value in data.iter_mut() {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// Softmax activation function applied row-wise.
///
/// Converts logits to probabilities for each row. Uses the max-subtraction
/// trick for numerical stability to avoid overflow with large values.
///
/// # Arguments
/// * `outputs` - Flat array containing row-major matrix data
/// * `rows` - Number of rows in the matrix
/// * `cols` - Number of columns in the matrix
pub fn softmax_rows(outputs: &mut [f32], rows: usize, cols: usize) {
    if cols == 0 {
        return;
    }
    assert_eq!(outputs.len(), rows * cols, "outputs length mismatch in softmax_rows");

    for row in outputs.chunks_exact_mut(cols).take(rows) {
        let mut max_value = row[0];
        for &value in row.iter().skip(1) {
            if value > max_value {
                max_value = value;
            }
        }

        let mut sum = 0.0f32;
        for value in row.iter_mut() {
            *value = (*value - max_value).exp();
            sum += *value;
        }

        let inv_sum = 1.0f32 / sum;
        for value in row.iter_mut() {
            *value *= inv_sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON_F32: f32 = 1e-6;

    #[test]
    fn test_sigmoid_zero() {
        assert!((sigmoid(0.0) - 0.5).abs() < EPSILON_F32);
    }

    #[test]
    fn test_sigmoid_range() {
        let mut data = vec![-50.0, -2.0, 0.0, 2.0, 50.0];
        sigmoid_inplace(&mut data);
        for &val in &data {
            assert!((0.0..=1.0).contains(&val));
        }
        assert!(data[1] < 0.5 && data[3] > 0.5);
    }

    #[test]
    fn test_relu_mixed() {
        let mut data = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        relu_inplace(&mut data);
        assert_eq!(data, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_softmax_single_row_sum() {
        let mut data = vec![1.0, 2.0, 3.0];
        softmax_rows(&mut data, 1, 3);
        let sum: f32 = data.iter().sum();
        assert!((sum - 1.0).abs() < EPSILON_F32);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let mut data = vec![1000.0, 1001.0, 1002.0];
        softmax_rows(&mut data, 1, 3);
        let sum: f32 = data.iter().sum();
        assert!((sum - 1.0).abs() < EPSILON_F32);
        assert!(!data.iter().any(|&x| x.is_nan() || x.is_infinite()));
    }

    #[test]
    fn test_activation_apply_softmax_per_row() {
        let mut data = vec![0.0, 0.0, 5.0, 5.0, 1.0, 1.0];
        Activation::Softmax.apply(&mut data, 2);
        for row in data.chunks(2) {
            assert!((row[0] - 0.5).abs() < EPSILON_F32);
            assert!((row[1] - 0.5).abs() < EPSILON_F32);
        }
    }

    #[test]
    fn test_activation_linear_is_identity() {
        let mut data = vec![-3.0, 4.0];
        Activation::Linear.apply(&mut data, 2);
        assert_eq!(data, vec![-3.0, 4.0]);
    }
}
