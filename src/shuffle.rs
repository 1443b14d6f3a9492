//! Slice shuffling over a [`tinyrand`] source.

use tinyrand::Rand;

/// Uniform index into `0..bound`. `bound` must be nonzero.
pub fn rand_index(rand: &mut impl Rand, bound: usize) -> usize {
    (rand.next_u64() % bound as u64) as usize
}

pub trait SliceExt {
    /// Fisher-Yates shuffle in place.
    fn shuffle(&mut self, rand: &mut impl Rand);
}

impl<T> SliceExt for [T] {
    fn shuffle(&mut self, rand: &mut impl Rand) {
        for index in (1..self.len()).rev() {
            let other = rand_index(rand, index + 1);
            self.swap(index, other);
        }
    }
}

#[cfg(test)]
mod tests {
    use tinyrand::{Seeded, StdRand};

    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rand = StdRand::seed(7);
        let mut items: Vec<u32> = (0..100).collect();
        items.shuffle(&mut rand);
        assert_ne!((0..100).collect::<Vec<_>>(), items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!((0..100).collect::<Vec<_>>(), sorted);
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let mut first: Vec<u32> = (0..32).collect();
        let mut second = first.clone();
        first.shuffle(&mut StdRand::seed(99));
        second.shuffle(&mut StdRand::seed(99));
        assert_eq!(first, second);
    }

    #[test]
    fn rand_index_stays_in_bounds() {
        let mut rand = StdRand::seed(3);
        for _ in 0..1000 {
            assert!(rand_index(&mut rand, 7) < 7);
        }
    }
}
