//! Test RNG: deterministic `DeterministicRng` implementations for tests.

use bingo_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min` for `next_u32_range`. Every slot
/// pick takes the first free cell and every shuffle draw swaps with position
/// zero.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a predetermined sequence, ignoring the
/// requested range. Panics if the sequence is exhausted. Used in tests that
/// need specific placements (slot picks, shuffle swaps, id digits).
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// Number of values not yet drawn.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len() - self.index
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}
