//! Progressive-widening Monte Carlo Tree Search over macro-actions.
//!
//! ## Overview
//!
//! - **Progressive widening**: a node with `n` visits holds at most
//!   `floor(pw_c * n^pw_alpha)` children, so large candidate lists are
//!   explored highest-prior first instead of all at once
//! - **Prior-weighted UCB**: selection adds a bonus that decays with visits
//! - **Greedy rollouts**: a short highest-prior continuation, then the
//!   engine's evaluator
//! - **Transpositions**: aggregates keyed by structural state hash
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eclipse_core::mcts::{Planner, PlannerConfig};
//!
//! let mut planner = Planner::new(engine, PlannerConfig::from_env())?;
//! let ranking = planner.plan(&state, me);
//! if let Some(best) = ranking.first() {
//!     println!("best: {} (prior {:.2})", best.kind, best.prior);
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod transposition;
pub mod tree;

pub use config::{PlannerConfig, TranspositionMode};
pub use diagnostics::{ChildDiagnostics, PlanDiagnostics};
pub use node::{widening_limit, ActionCursor, NodeId, SearchNode};
pub use policy::PriorUcb;
pub use search::Planner;
pub use stats::SearchStats;
pub use transposition::{TranspositionEntry, TranspositionTable};
pub use tree::{SearchTree, TreeStats};
