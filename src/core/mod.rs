//! Shared building blocks: players, deterministic RNG, structural hashing, errors.

pub mod error;
pub mod hash;
pub mod player;
pub mod rng;

pub use error::{ConfigError, EvaluationError, SnapshotError};
pub use hash::structural_hash;
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
