//! Random ordering of curriculum candidates.
//!
//! Curriculum generation takes its randomness through [`Shuffler`] so that
//! tests can pin the order with a seed or skip shuffling entirely.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Source of random permutations
pub trait Shuffler {
    fn shuffle<T>(&mut self, items: &mut [T]);
}

/// Shuffler backed by any `rand` generator
#[derive(Clone, Debug)]
pub struct RngShuffler<R: Rng> {
    rng: R,
}

impl<R: Rng> RngShuffler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngShuffler<StdRng> {
    /// Deterministic shuffler: the same seed always yields the same order
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Shuffler for RngShuffler<R> {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Leaves candidates in catalog order
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();

        RngShuffler::seeded(7).shuffle(&mut a);
        RngShuffler::seeded(7).shuffle(&mut b);

        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..20).collect();
        RngShuffler::seeded(99).shuffle(&mut items);
        items.sort_unstable();
        assert_eq!(items, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_keep_order_is_identity() {
        let mut items = vec!["a", "b", "c"];
        KeepOrder.shuffle(&mut items);
        assert_eq!(items, vec!["a", "b", "c"]);
    }
}
