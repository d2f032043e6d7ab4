//! Error types shared by the combat, belief and planning modules.
//!
//! Only caller mistakes are errors. Running out of candidate actions or
//! particle hypotheses is handled locally and never surfaces here.

use thiserror::Error;

/// Invalid configuration supplied by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{side} fleet has no ships")]
    EmptyFleet { side: String },

    #[error("weapon profile for {weapon} has base target {base_to_hit} (must be 1..=6)")]
    InvalidTarget { weapon: String, base_to_hit: u8 },

    #[error("weapon profile for {weapon} deals zero damage")]
    ZeroDamage { weapon: String },

    #[error("ship {ship} mounts {weapon} but the weapon table has no profile for it")]
    MissingWeaponProfile { ship: String, weapon: String },

    #[error("ship {ship} has hull {hull} above its maximum {max_hull}")]
    HullAboveMaximum { ship: String, hull: i32, max_hull: i32 },

    #[error("point defense on {side} has base target {base} (must be 1..=6)")]
    InvalidPointDefense { side: String, base: u8 },

    #[error("bag composition is empty")]
    EmptyBag,

    #[error("particle count must be at least 1")]
    NoParticles,

    #[error("unknown bag '{bag}'")]
    UnknownBag { bag: String },

    #[error("category '{category}' is not part of bag '{bag}'")]
    UnknownCategory { bag: String, category: String },

    #[error("cannot draw from bag '{bag}': no tiles remain in any hypothesis")]
    BagExhausted { bag: String },

    #[error("forgetting weight {rho} must lie in [0, 1]")]
    InvalidForgetting { rho: f64 },

    #[error("invalid belief parameter {name} = {value}")]
    InvalidBeliefParameter { name: &'static str, value: f64 },

    #[error("invalid planner parameter {name} = {value}")]
    InvalidPlannerParameter { name: &'static str, value: f64 },
}

/// Failure inside a state evaluator. The planner substitutes a neutral value.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error("evaluator unavailable: {0}")]
    Unavailable(String),

    #[error("state cannot be evaluated: {0}")]
    Unevaluable(String),
}

/// Failure decoding a serialized belief snapshot.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("binary snapshot error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("json snapshot error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot is inconsistent: {0}")]
    Config(#[from] ConfigError),
}
