//! Random draws for exercise generation
//!
//! Every random choice (word, withheld letter, operands, operator) goes
//! through [`RandomSource`], so tests can script the exact sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform integer draws
pub trait RandomSource: Send {
    /// Uniform integer in `[low, high)`. Returns `low` when the range is empty.
    fn draw(&mut self, low: i64, high: i64) -> i64;

    /// Uniform index in `[0, len)`
    fn index(&mut self, len: usize) -> usize {
        self.draw(0, len as i64) as usize
    }

    /// Fair coin
    fn flip(&mut self) -> bool {
        self.draw(0, 2) == 1
    }
}

/// PCG-backed source; reproducible when built from a seed
pub struct PcgSource {
    rng: Pcg32,
}

impl PcgSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }
}

impl RandomSource for PcgSource {
    fn draw(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.random_range(low..high)
    }
}

/// Replays a fixed list of values, cycling when exhausted.
///
/// Each value is folded into the requested range, so a script written for
/// one range never produces an out-of-range draw.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<i64>,
    pos: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<i64>>) -> Self {
        Self {
            values: values.into(),
            pos: 0,
        }
    }
}

impl RandomSource for ScriptedSource {
    fn draw(&mut self, low: i64, high: i64) -> i64 {
        if low >= high || self.values.is_empty() {
            return low;
        }
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        if (low..high).contains(&value) {
            value
        } else {
            low + (value - low).rem_euclid(high - low)
        }
    }
}
