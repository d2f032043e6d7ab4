//! Rules engine trait and the planning inputs around it.
//!
//! Games implement `RulesEngine` to define:
//! - Candidate macro-actions for a state
//! - How actions produce successor states
//! - How states are scored
//!
//! The planner calls into `RulesEngine` but never interprets
//! game-specific concepts directly.

pub mod action;
pub mod context;
pub mod engine;
pub mod prior;

pub use action::{ActionKind, MacroAction};
pub use context::{OpponentProfile, OpponentTag, PlanningContext, ThreatMap};
pub use engine::RulesEngine;
pub use prior::{ActionPrior, ContextualPrior, EnginePrior};
