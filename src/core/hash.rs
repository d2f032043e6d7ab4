//! 64-bit structural hashing of planner states.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Hash any `Hash` value into a stable 64-bit key.
///
/// Two states that compare structurally equal map to the same key, which is
/// what the transposition table aggregates on.
#[must_use]
pub fn structural_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_values_share_hash() {
        let a = (3u32, vec![1u8, 2, 3], "fleet");
        let b = (3u32, vec![1u8, 2, 3], "fleet");
        assert_eq!(structural_hash(&a), structural_hash(&b));
    }

    #[test]
    fn test_different_values_differ() {
        assert_ne!(structural_hash(&(1u32, 2u32)), structural_hash(&(2u32, 1u32)));
    }
}
