//! # eclipse-core
//!
//! Decision core for a 4X space strategy game: a macro-action planner,
//! a stochastic fleet-battle resolver and opponent/bag belief tracking.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic Planner**: the planner only sees `RulesEngine`
//!    callbacks and opaque action payloads. Game concepts stay in the engine.
//!
//! 2. **Deterministic**: every random draw comes from a seeded `GameRng`.
//!    Equal inputs and seeds give equal plans, battles and beliefs.
//!
//! 3. **Exhaustion Is Not An Error**: running out of candidate actions or
//!    particle hypotheses is handled locally. Only caller mistakes surface
//!    as `ConfigError`.
//!
//! ## Architecture
//!
//! - **Progressive-Widening MCTS**: children are added highest-prior first,
//!   at most `floor(pw_c * visits^pw_alpha)` per node.
//!
//! - **Arena Tree + Transposition Table**: nodes are addressed by index;
//!   aggregates for equal states are kept in a separate hash-keyed table.
//!
//! - **Persistent Data Structures**: `im-rs` histories and particle pins keep
//!   resampling clones cheap.
//!
//! ## Modules
//!
//! - `core`: players, RNG, structural hashing, errors
//! - `rules`: `RulesEngine` trait, macro-actions, priors and planning context
//! - `combat`: battle resolution and Monte Carlo estimates
//! - `belief`: archetype HMM and bag particle filters
//! - `mcts`: the progressive-widening planner
//! - `games`: reference `RulesEngine` implementations

pub mod core;
pub mod rules;
pub mod combat;
pub mod belief;
pub mod mcts;
pub mod games;

pub use crate::core::{
    structural_hash, ConfigError, EvaluationError, SnapshotError,
    GameRng, GameRngState, PlayerId, PlayerMap,
};

pub use crate::rules::{
    ActionKind, ActionPrior, ContextualPrior, EnginePrior, MacroAction,
    OpponentProfile, OpponentTag, PlanningContext, RulesEngine, ThreatMap,
};

pub use crate::combat::{
    estimate_combat, resolve_combat, resolve_combat_with,
    CombatConfig, CombatEstimate, CombatOutcome, CombatTrace, Combatant,
    Dice, PointDefense, RuleToggles, ScriptedDice, Ship, ShipClass, Side,
    TargetingPolicy, WeaponKind, WeaponProfile, WeaponTable,
};

pub use crate::belief::{
    Archetype, ArchetypeDistribution, ArchetypeModel, BagComposition,
    BeliefConfig, BeliefSnapshot, BeliefTracker, ParticleSet, Signal,
};

pub use crate::mcts::{
    PlanDiagnostics, Planner, PlannerConfig, SearchStats, SearchTree,
    TranspositionMode, TreeStats,
};
