//! Weight initialisers.
//!
//! Kernels are drawn from a seeded `StdRng` so a model built twice with the
//! same seed carries identical weights. Biases always start at zero.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Standard deviation of a unit normal truncated to `[-2, 2]`.
const TRUNCATED_NORMAL_STDDEV: f32 = 0.879_625_66;

/// Kernel initialisation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Initializer {
    /// Uniform in `[-limit, limit]` with `limit = sqrt(6 / (fan_in + fan_out))`.
    #[default]
    GlorotUniform,
    /// Normal truncated at two standard deviations, with the stddev scaled so the
    /// truncated samples keep variance `2 / fan_in` (Keras 2.2.3 and later).
    HeNormal,
}

impl Initializer {
    /// Fills `weights` according to the scheme.
    pub fn fill(self, weights: &mut [f32], fan_in: usize, fan_out: usize, rng: &mut StdRng) {
        match self {
            Initializer::GlorotUniform => {
                let limit = (6.0f32 / (fan_in + fan_out).max(1) as f32).sqrt();
                for value in weights.iter_mut() {
                    *value = rng.gen_range(-limit..=limit);
                }
            }
            Initializer::HeNormal => {
                let stddev = (2.0f32 / fan_in.max(1) as f32).sqrt() / TRUNCATED_NORMAL_STDDEV;
                for value in weights.iter_mut() {
                    let z = loop {
                        let z: f32 = StandardNormal.sample(rng);
                        if z.abs() <= 2.0 {
                            break z;
                        }
                    };
                    *value = z * stddev;
                }
            }
        }
    }
}
