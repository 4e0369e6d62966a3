//! Pluggable random sources for spawn attributes and jitter.
//!
//! Everything random in a simulation is drawn through [`RandomSource`], so a
//! seeded generator or a fixed sequence can be swapped in for reproducible
//! runs and tests.
//!
//! ```ignore
//! let store = Simulation::new()
//!     .with_random(SeededRandom::new(7))
//!     .build()?;
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed values.
///
/// Implementors only provide [`next_unit`](RandomSource::next_unit); the
/// range helpers are derived from it.
pub trait RandomSource: Send {
    /// Next value in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform value in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_unit()
    }

    /// Uniform value in `[-half, half)`.
    #[inline]
    fn symmetric(&mut self, half: f32) -> f32 {
        let half = half.abs();
        self.range(-half, half)
    }

    /// `true` with probability `p`.
    #[inline]
    fn chance(&mut self, p: f32) -> bool {
        self.next_unit() < p
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    #[inline]
    fn index(&mut self, len: usize) -> usize {
        let i = (self.next_unit() * len as f32) as usize;
        i.min(len.saturating_sub(1))
    }
}

/// Fast seeded generator backed by [`SmallRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    /// Deterministic generator: the same seed yields the same stream.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        self.rng.gen()
    }
}

/// Cycles through a fixed list of unit values.
///
/// Values are clamped into `[0, 1)`. An empty list behaves like
/// `FixedSequence::constant(0.5)`.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f32>,
    cursor: usize,
}

impl FixedSequence {
    /// Sequence that repeats `values` forever.
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        let mut values: Vec<f32> = values
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, ONE_BELOW) } else { 0.0 })
            .collect();
        if values.is_empty() {
            values.push(0.5);
        }
        Self { values, cursor: 0 }
    }

    /// Sequence that always yields `value`.
    pub fn constant(value: f32) -> Self {
        Self::new([value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

const ONE_BELOW: f32 = 1.0 - f32::EPSILON;

impl RandomSource for FixedSequence {
    fn next_unit(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
