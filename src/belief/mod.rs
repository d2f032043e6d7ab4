//! Beliefs about hidden information.
//!
//! - [`ArchetypeModel`]: HMM over opponent ship-design archetypes, fed by
//!   observed [`Signal`]s.
//! - [`ParticleSet`]: particle filter over the remaining contents of a tile bag.
//! - [`BeliefTracker`]: owns both for one planning session and snapshots them.

pub mod config;
pub mod hmm;
pub mod math;
pub mod particle;
pub mod signal;
pub mod tracker;

pub use config::BeliefConfig;
pub use hmm::{ArchetypeDistribution, ArchetypeModel, MIN_PROBABILITY, UNSEEN_EMISSION};
pub use math::{ln_binomial, ln_hypergeometric};
pub use particle::{BagComposition, Particle, ParticleSet};
pub use signal::{Archetype, Signal, UnknownSignal};
pub use tracker::{BagSummary, BeliefSnapshot, BeliefTracker, OpponentHistory};
