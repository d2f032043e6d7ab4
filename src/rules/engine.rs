//! Rules engine trait for game implementations.
//!
//! The planner never interprets game concepts. It asks the engine for
//! candidate macro-actions, applies them to produce successor states and
//! scores leaf states with the engine's evaluator.

use std::fmt::Debug;
use std::hash::Hash;

use super::action::MacroAction;
use crate::core::{EvaluationError, GameRng, PlayerId};

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `candidate_actions`: finite and deterministic for the same state; should
///   include a pass action when nothing else is legal or profitable
/// - `apply_action`: pure; must not mutate its input
/// - `evaluate`: errors are absorbed by the planner as a neutral 0
/// - `State: Hash` identifies transpositions, so equal states must hash equally
pub trait RulesEngine {
    /// Full game state as seen by the planning player.
    type State: Clone + Hash;

    /// Game-specific action data carried through the plan unchanged.
    type Payload: Clone + Debug;

    /// Candidate macro-actions for `player`, each with a prior weight.
    fn candidate_actions(&self, state: &Self::State, player: PlayerId) -> Vec<MacroAction<Self::Payload>>;

    /// Successor state after `player` takes `action`.
    fn apply_action(
        &self,
        state: &Self::State,
        player: PlayerId,
        action: &MacroAction<Self::Payload>,
    ) -> Self::State;

    /// Scalar value of `state` from `player`'s perspective.
    fn evaluate(&self, state: &Self::State, player: PlayerId) -> Result<f64, EvaluationError>;

    /// Sample hidden information into a concrete state before searching.
    ///
    /// Called once at the root. The default keeps the state as is.
    fn determinize(&self, state: &Self::State, _rng: &mut GameRng) -> Self::State {
        state.clone()
    }
}
