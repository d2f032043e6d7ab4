//! Seeded dice and sampling stream.
//!
//! Battles, particle resampling and determinization all draw from a
//! `GameRng`. The stream position can be captured so a restored particle
//! filter continues with exactly the draws the original would have made.
//!
//! ```
//! use eclipse_core::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! let faces: Vec<u8> = (0..8).map(|_| a.roll_d6()).collect();
//! assert_eq!(faces, (0..8).map(|_| b.roll_d6()).collect::<Vec<_>>());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// ChaCha8 stream plus the seed it started from.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Face of a six-sided die, 1..=6.
    pub fn roll_d6(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }

    /// Uniform in `[0, 1)`.
    pub fn gen_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Index drawn proportionally to `weights`.
    ///
    /// Non-finite and non-positive weights never win. `None` when no weight
    /// is usable.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let usable = |w: f64| w.is_finite() && w > 0.0;
        let total: f64 = weights.iter().copied().filter(|w| usable(*w)).sum();
        if total <= 0.0 {
            return None;
        }

        let mut remaining = self.gen_unit() * total;
        for (i, &weight) in weights.iter().enumerate().filter(|(_, w)| usable(**w)) {
            remaining -= weight;
            if remaining <= 0.0 {
                return Some(i);
            }
        }
        // rounding can leave a sliver past the last usable weight
        weights.iter().rposition(|w| usable(*w))
    }

    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Seed and stream position, enough to resume a `GameRng`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_faces() {
        let mut a = GameRng::new(9);
        let mut b = GameRng::new(9);
        assert!((0..100).all(|_| a.roll_d6() == b.roll_d6()));
        assert_eq!(a.seed(), 9);
    }

    #[test]
    fn test_d6_covers_all_faces() {
        let mut rng = GameRng::new(7);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let face = rng.roll_d6();
            assert!((1..=6).contains(&face));
            seen[usize::from(face - 1)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_choose_weighted_skips_unusable() {
        let mut rng = GameRng::new(42);
        for _ in 0..10 {
            assert_eq!(rng.choose_weighted(&[100.0, 0.0, 0.0]), Some(0));
        }
        assert_eq!(rng.choose_weighted(&[]), None);
        assert_eq!(rng.choose_weighted(&[0.0, -1.0]), None);
        assert_eq!(rng.choose_weighted(&[0.0, f64::NAN, 3.0]), Some(2));
    }

    #[test]
    fn test_restored_state_resumes_stream() {
        let mut rng = GameRng::new(42);
        for _ in 0..37 {
            rng.gen_unit();
        }
        let saved = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.roll_d6()).collect();

        let mut restored = GameRng::from_state(&saved);
        let actual: Vec<_> = (0..10).map(|_| restored.roll_d6()).collect();
        assert_eq!(expected, actual);
    }
}
