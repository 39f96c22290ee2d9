//! Random number helpers.
//!
//! All randomness in the engine flows through [`RandomSource`], which is
//! implemented for every [`rand::Rng`]. Runs are seeded through
//! [`create_rng`] so identical seeds replay identical runs.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Uniform draws and in-place shuffling.
pub trait RandomSource {
    /// Returns a uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Shuffles `items` in place (Fisher–Yates).
    fn shuffle<T>(&mut self, items: &mut [T]);
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}

/// Creates a deterministic generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
