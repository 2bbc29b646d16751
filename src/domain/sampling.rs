//! Uniform integer sampling for the emitter's random streams.
//!
//! The emitter consumes two unbounded lazy sequences: one of wait times
//! and one of increment amounts. Both are modelled here as pull-based
//! streams over a half-open `[min, max)` range, each owning its RNG so
//! two streams never share state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Error raised when a range cannot produce any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sample range requires min < max, got [{min}, {max})")]
pub struct EmptyRange {
    /// Inclusive lower bound that was requested.
    pub min: u64,
    /// Exclusive upper bound that was requested.
    pub max: u64,
}

/// Half-open integer range `[min, max)` for uniform draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    min: u64,
    max: u64,
}

impl SampleRange {
    /// Create a range, rejecting empty ones.
    ///
    /// # Errors
    /// Returns [`EmptyRange`] when `min >= max`.
    pub fn new(min: u64, max: u64) -> Result<Self, EmptyRange> {
        if min >= max {
            return Err(EmptyRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Exclusive upper bound.
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Whether a drawn value lies within the range.
    pub fn contains(&self, value: u64) -> bool {
        value >= self.min && value < self.max
    }
}

impl std::fmt::Display for SampleRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}

/// Infinite pull-based stream of uniform draws from a fixed range.
///
/// Wraps its own `StdRng` (`rand`'s seedable standard RNG) so a stream
/// can be made reproducible in tests via [`UniformStream::seeded`] while
/// production streams stay entropy-seeded and non-reproducible.
#[derive(Debug)]
pub struct UniformStream {
    rng: StdRng,
    range: SampleRange,
}

impl UniformStream {
    /// Stream with a fresh entropy seed. Draws differ across runs.
    pub fn from_entropy(range: SampleRange) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range,
        }
    }

    /// Stream with a fixed seed. Draws are reproducible.
    pub fn seeded(range: SampleRange, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range,
        }
    }

    /// The range this stream draws from.
    pub fn range(&self) -> SampleRange {
        self.range
    }

    /// Draw the next value. Never exhausts.
    pub fn draw(&mut self) -> u64 {
        self.rng.gen_range(self.range.min..self.range.max)
    }
}

impl Iterator for UniformStream {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rejects_min_equal_max() {
        let err = SampleRange::new(10, 10).unwrap_err();
        assert_eq!(err, EmptyRange { min: 10, max: 10 });
    }

    #[test]
    fn test_range_rejects_min_above_max() {
        assert!(SampleRange::new(100, 10).is_err());
    }

    #[test]
    fn test_draws_stay_within_bounds() {
        let range = SampleRange::new(10, 100).unwrap();
        let mut stream = UniformStream::from_entropy(range);
        for _ in 0..10_000 {
            let value = stream.draw();
            assert!(range.contains(value), "draw {value} outside {range}");
        }
    }

    #[test]
    fn test_single_value_range_is_constant() {
        let range = SampleRange::new(1, 2).unwrap();
        let mut stream = UniformStream::from_entropy(range);
        for _ in 0..100 {
            assert_eq!(stream.draw(), 1);
        }
    }

    #[test]
    fn test_seeded_streams_are_reproducible() {
        let range = SampleRange::new(0, 1_000_000).unwrap();
        let a: Vec<u64> = UniformStream::seeded(range, 42).take(32).collect();
        let b: Vec<u64> = UniformStream::seeded(range, 42).take(32).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let range = SampleRange::new(0, 1_000_000).unwrap();
        let a: Vec<u64> = UniformStream::seeded(range, 1).take(32).collect();
        let b: Vec<u64> = UniformStream::seeded(range, 2).take(32).collect();
        assert_ne!(a, b);
    }
}
