//! Macro-actions: one player-turn decision plus its game-specific payload.

use serde::{Deserialize, Serialize};

/// Kind of a macro-action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Explore,
    Influence,
    Research,
    Upgrade,
    Build,
    MoveFight,
    Diplomacy,
    /// Ends the turn without other effects. Applying it leaves the state unchanged.
    Pass,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::Explore,
        ActionKind::Influence,
        ActionKind::Research,
        ActionKind::Upgrade,
        ActionKind::Build,
        ActionKind::MoveFight,
        ActionKind::Diplomacy,
        ActionKind::Pass,
    ];

    /// Context-free prior weight of this kind.
    #[must_use]
    pub fn base_weight(self) -> f64 {
        match self {
            ActionKind::Research => 0.6,
            ActionKind::Upgrade | ActionKind::Build => 0.5,
            ActionKind::Explore | ActionKind::MoveFight => 0.4,
            ActionKind::Influence => 0.3,
            ActionKind::Diplomacy => 0.2,
            ActionKind::Pass => 0.0,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Explore => "explore",
            ActionKind::Influence => "influence",
            ActionKind::Research => "research",
            ActionKind::Upgrade => "upgrade",
            ActionKind::Build => "build",
            ActionKind::MoveFight => "move_fight",
            ActionKind::Diplomacy => "diplomacy",
            ActionKind::Pass => "pass",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A candidate decision handed to the planner.
///
/// The payload is opaque to the planner and returned unchanged in the plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacroAction<P> {
    pub kind: ActionKind,
    pub payload: P,
    /// Prior weight in [0, 1].
    pub prior: f64,
}

impl<P> MacroAction<P> {
    /// An action with the kind's base weight as prior.
    #[must_use]
    pub fn new(kind: ActionKind, payload: P) -> Self {
        Self {
            kind,
            payload,
            prior: kind.base_weight(),
        }
    }

    #[must_use]
    pub fn with_prior(mut self, prior: f64) -> Self {
        self.prior = prior;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.kind == ActionKind::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_weights() {
        assert_eq!(ActionKind::Research.base_weight(), 0.6);
        assert_eq!(ActionKind::Pass.base_weight(), 0.0);
        assert!(ActionKind::ALL.iter().all(|k| (0.0..=1.0).contains(&k.base_weight())));
    }

    #[test]
    fn test_macro_action() {
        let action = MacroAction::new(ActionKind::Build, "interceptor");
        assert_eq!(action.prior, 0.5);
        assert!(!action.is_pass());
        assert_eq!(action.with_prior(0.9).prior, 0.9);
        assert!(MacroAction::new(ActionKind::Pass, ()).is_pass());
    }
}
