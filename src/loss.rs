//! Entropy-weighted cross-entropy.
//!
//! Each predicted probability `p` with label `y` contributes
//! `y * (-ln p)^γ + (1 - y) * (-ln(1 - p))^γ`; the loss is the mean over all
//! elements of the batch. With `γ < 1` confident mistakes are penalised less
//! steeply than with plain cross-entropy, which damps the effect of noisy labels.

/// Predictions are clipped into `[EPSILON, 1 - EPSILON]`.
pub const EPSILON: f32 = 1e-7;
/// Exponent applied to each per-element log term.
pub const GAMMA: f32 = 0.3;

/// A loss over flat label and prediction buffers of equal length.
pub trait Loss {
    /// Mean loss over all elements.
    fn loss(&self, y_true: &[f32], y_pred: &[f32]) -> f32;

    /// Writes d(loss)/d(y_pred) into `grad`.
    fn gradient(&self, y_true: &[f32], y_pred: &[f32], grad: &mut [f32]);
}

/// [`Loss`] implementation of [`en_loss`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyWeightedLoss;

impl Loss for EntropyWeightedLoss {
    fn loss(&self, y_true: &[f32], y_pred: &[f32]) -> f32 {
        en_loss(y_true, y_pred)
    }

    fn gradient(&self, y_true: &[f32], y_pred: &[f32], grad: &mut [f32]) {
        en_loss_gradient(y_true, y_pred, grad);
    }
}

fn clip(p: f32) -> f32 {
    p.clamp(EPSILON, 1.0 - EPSILON)
}

/// Entropy-weighted loss of a batch, e.g. `batch × 3` one-hot labels against
/// softmax outputs.
///
/// Returns 0 for empty buffers.
///
/// # Panics
///
/// Panics if the buffers differ in length.
///
/// # Examples
///
/// ```
/// use rta_cnn::loss::en_loss;
///
/// let y_true = [0.0, 1.0, 0.0];
/// let good = en_loss(&y_true, &[0.05, 0.9, 0.05]);
/// let bad = en_loss(&y_true, &[0.6, 0.2, 0.2]);
/// assert!(good < bad);
/// ```
pub fn en_loss(y_true: &[f32], y_pred: &[f32]) -> f32 {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "y_true and y_pred must have the same length"
    );
    if y_true.is_empty() {
        return 0.0;
    }

    let total: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&y, &p)| {
            let p = clip(p);
            let pos = (-p.ln()).powf(GAMMA);
            let neg = (-(1.0 - p).ln()).powf(GAMMA);
            (y * pos + (1.0 - y) * neg) as f64
        })
        .sum();
    (total / y_true.len() as f64) as f32
}

/// Gradient of [`en_loss`] with respect to each prediction.
///
/// Elements whose prediction lies outside `[EPSILON, 1 - EPSILON]` get a zero
/// gradient, as the clipped loss is flat there.
///
/// # Panics
///
/// Panics if the three buffers differ in length.
pub fn en_loss_gradient(y_true: &[f32], y_pred: &[f32], grad: &mut [f32]) {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "y_true and y_pred must have the same length"
    );
    assert_eq!(grad.len(), y_pred.len(), "grad must match y_pred in length");

    let n = y_true.len() as f32;
    for ((g, &y), &p) in grad.iter_mut().zip(y_true).zip(y_pred) {
        if !(EPSILON..=1.0 - EPSILON).contains(&p) {
            *g = 0.0;
            continue;
        }
        // d/dp (-ln p)^γ = -γ (-ln p)^(γ-1) / p
        let d_pos = -GAMMA * (-p.ln()).powf(GAMMA - 1.0) / p;
        // d/dp (-ln(1-p))^γ = γ (-ln(1-p))^(γ-1) / (1-p)
        let d_neg = GAMMA * (-(1.0 - p).ln()).powf(GAMMA - 1.0) / (1.0 - p);
        *g = (y * d_pos + (1.0 - y) * d_neg) / n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_element_value() {
        // y = 1, p = e^-1: (-ln p)^0.3 = 1
        let p = (-1.0f32).exp();
        assert_relative_eq!(en_loss(&[1.0], &[p]), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(en_loss(&[], &[]), 0.0);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_length_mismatch_panics() {
        en_loss(&[1.0, 0.0], &[0.5]);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let y_true = [0.0, 1.0, 0.0, 1.0];
        let y_pred = [0.2, 0.7, 0.4, 0.1];
        let mut grad = [0.0f32; 4];
        en_loss_gradient(&y_true, &y_pred, &mut grad);

        let h = 1e-3f32;
        for i in 0..4 {
            let mut plus = y_pred;
            let mut minus = y_pred;
            plus[i] += h;
            minus[i] -= h;
            let numeric = (en_loss(&y_true, &plus) - en_loss(&y_true, &minus)) / (2.0 * h);
            assert_relative_eq!(grad[i], numeric, max_relative = 1e-2);
        }
    }

    #[test]
    fn test_gradient_zero_when_clipped() {
        let mut grad = [1.0f32; 2];
        en_loss_gradient(&[1.0, 0.0], &[0.0, 1.0], &mut grad);
        assert_eq!(grad, [0.0, 0.0]);
    }

    #[test]
    fn test_trait_delegates() {
        let loss = EntropyWeightedLoss;
        let y_true = [1.0, 0.0, 0.0];
        let y_pred = [0.5, 0.3, 0.2];
        assert_eq!(loss.loss(&y_true, &y_pred), en_loss(&y_true, &y_pred));
    }
}
