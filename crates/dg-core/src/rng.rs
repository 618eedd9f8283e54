//! Random number generation for dungeon layout
//!
//! Uses a seeded ChaCha RNG so that the same seed always reproduces the same
//! dungeon. Every pipeline stage borrows the one generator in a fixed order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Dungeon random number generator
///
/// Wraps ChaCha8Rng. The range helpers follow the conventions the layout
/// algorithms were tuned with: integer ranges exclude their upper bound and
/// collapse to the lower bound when empty.
#[derive(Debug, Clone)]
pub struct DungeonRng {
    rng: ChaCha8Rng,
    seed: u32,
}

impl DungeonRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(u64::from(seed)),
            seed,
        }
    }

    /// Draw a fresh seed from the thread RNG
    pub fn random_seed() -> u32 {
        rand::random()
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        Self::new(Self::random_seed())
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns 0..n-1
    ///
    /// Returns 0 if n is 0.
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Integer in `lo..hi`, or `lo` when the range is empty
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Integer in `lo..=hi`, or `lo` when the range is empty
    pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi < lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Float in `lo..hi`, or `lo` when the range is empty
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if lo.is_nan() || hi.is_nan() || hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Fair coin flip
    pub fn coin(&mut self) -> bool {
        self.rn2(2) == 0
    }
}

impl Default for DungeonRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
