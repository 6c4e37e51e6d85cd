//! Random value generator adapter backed by `rand`.

use std::sync::Mutex;

use echocheck_application::ports::ValueGenerator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws scenario inputs from a `StdRng`.
///
/// Seeded generators yield the same sequence on every run.
#[derive(Debug)]
pub struct RandomValueGenerator {
    rng: Mutex<StdRng>,
}

impl RandomValueGenerator {
    /// Generator with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_rng(&mut rand::rng())),
        }
    }

    /// Seeded when `seed` is set, from entropy otherwise.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl ValueGenerator for RandomValueGenerator {
    fn next_below(&self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        // A poisoned lock still holds a usable RNG.
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.random_range(0..upper)
    }
}
