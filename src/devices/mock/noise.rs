//! Seeded Gaussian noise source for the mock device

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Deterministic Gaussian noise generator
pub struct NoiseGenerator {
    rng: StdRng,
}

impl NoiseGenerator {
    /// Create a generator from a fixed seed (reproducible runs)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample a zero-mean Gaussian with the given standard deviation
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev <= 0.0 {
            return 0.0;
        }
        match Normal::new(0.0, stddev) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }
}
