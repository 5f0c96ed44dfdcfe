//! Random number generator abstraction for determinism.
//!
//! Slot assignment, board shuffling and id minting all draw from a
//! `DeterministicRng`. Production code injects [`SystemRng`]; tests inject a
//! [`SeededRng`] or a scripted implementation so placements can be asserted.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Pick a uniformly distributed index into a collection of `len` items.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero or does not fit in a `u32`.
    fn next_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick an index from an empty collection");
        let max = u32::try_from(len - 1).expect("collection length exceeds u32");
        self.next_u32_range(0, max) as usize
    }
}

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Creates a generator seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }
}

/// Reproducible RNG: the same seed always yields the same sequence.
#[derive(Debug, Clone)]
pub struct SeededRng(StdRng);

impl SeededRng {
    /// Creates a generator from a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for SeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }
}
