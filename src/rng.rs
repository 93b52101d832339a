//! Seeded random stream shared by every stage of a generation pass

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The single pseudorandom stream of a generation pass
///
/// Site sampling, coastline, lakes, rivers and tributaries all draw from one
/// handle in that order. Reordering the stages changes every later draw.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: ChaCha8Rng,
}

impl RngHandle {
    /// Create a stream from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform float in `[low, high)`
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    /// Uniform index in `[0, len)`, `None` when `len == 0`
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }

    /// Uniform index in the inclusive range `[low, high]`
    pub fn index_inclusive(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Pick one element uniformly
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
