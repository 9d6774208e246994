//! Random level generation
//!
//! Levels follow a geometric distribution truncated at `max_level`:
//! each trial promotes the node one level with probability `p`, and the
//! trials stop at the first failure or at the cap.

use rand::Rng;

use crate::config::{DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY, MAX_LEVEL_LIMIT};
use crate::error::{Result, SkipKvError};

/// Draws node levels for a skip list
///
/// Draws use `rand::thread_rng()`, so every thread pulls from its own
/// independently seeded stream and concurrent inserts never contend on a
/// shared generator.
#[derive(Debug, Clone, Copy)]
pub struct LevelGenerator {
    max_level: usize,
    probability: f64,
}

impl LevelGenerator {
    /// Create a generator capped at `max_level` with promotion probability `probability`
    ///
    /// Fails if `max_level > MAX_LEVEL_LIMIT` or `probability` is outside `[0, 1)`.
    pub fn new(max_level: usize, probability: f64) -> Result<Self> {
        if max_level > MAX_LEVEL_LIMIT {
            return Err(SkipKvError::Config(format!(
                "max_level {} exceeds limit {}",
                max_level, MAX_LEVEL_LIMIT
            )));
        }

        if !(0.0..1.0).contains(&probability) {
            return Err(SkipKvError::Config(format!(
                "probability {} must be in [0, 1)",
                probability
            )));
        }

        Ok(Self {
            max_level,
            probability,
        })
    }

    /// Highest level this generator can return
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Per-level promotion probability
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Draw a level from the calling thread's generator
    pub fn random_level(&self) -> usize {
        self.random_level_with(&mut rand::thread_rng())
    }

    /// Draw a level from a caller-supplied generator
    pub fn random_level_with<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut level = 0;
        while level < self.max_level && rng.gen::<f64>() < self.probability {
            level += 1;
        }
        level
    }
}

impl Default for LevelGenerator {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
        }
    }
}
