//! Random source for particle initialization and resets.
//!
//! Wraps a small, seedable RNG with the handful of draws particles need, so
//! the simulation can be made reproducible by fixing the seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seedable random source owned by a [`Simulation`](crate::Simulation).
///
/// ```ignore
/// let mut spawner = Spawner::new(Some(7));
/// let radius = spawner.random_int(3, 10);       // 3..=9
/// let x = spawner.random_span(radius as f32, 800.0 - 2.0 * radius as f32);
/// ```
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    /// Create a spawner. `None` seeds from the system clock, so every run
    /// differs.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 between 0.0 (inclusive) and 1.0 (exclusive).
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random integer in `min..max`. Returns `min` when the range is empty.
    #[inline]
    pub fn random_int(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            min
        } else {
            self.rng.gen_range(min..max)
        }
    }

    /// `start + random() * extent`.
    ///
    /// Unlike `gen_range`, a zero or negative extent is allowed, which keeps
    /// spawning well-defined on surfaces smaller than a particle.
    #[inline]
    pub fn random_span(&mut self, start: f32, extent: f32) -> f32 {
        start + self.random() * extent
    }

    /// Random value in `-half..half`.
    #[inline]
    pub fn random_signed(&mut self, half: f32) -> f32 {
        self.random() * 2.0 * half - half
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new(None)
    }
}
