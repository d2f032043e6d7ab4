//! Action priors: how promising a macro-action looks before any search.

use super::action::{ActionKind, MacroAction};
use super::context::PlanningContext;

/// Rescores candidate actions before the planner orders them.
pub trait ActionPrior {
    /// Prior in [0, 1] for `action`. `context` is `None` when the caller has no
    /// opponent or threat information.
    fn score<P>(&self, action: &MacroAction<P>, context: Option<&PlanningContext>) -> f64;
}

/// Keeps whatever prior the rules engine attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnginePrior;

impl ActionPrior for EnginePrior {
    fn score<P>(&self, action: &MacroAction<P>, _context: Option<&PlanningContext>) -> f64 {
        action.prior.clamp(0.0, 1.0)
    }
}

/// Base weights by action kind, shifted by border danger and opponent aggression.
///
/// Danger favors building and upgrading over exploring and influencing.
/// Aggressive opponents push further toward defense. From round 7 on,
/// research loses value since new tech has few rounds left to pay off.
/// Without a context the engine's prior is returned unchanged.
#[derive(Clone, Debug)]
pub struct ContextualPrior {
    pub danger_weight: f64,
    pub aggression_weight: f64,
    pub late_round: u32,
    pub late_research_penalty: f64,
}

impl Default for ContextualPrior {
    fn default() -> Self {
        Self {
            danger_weight: 0.3,
            aggression_weight: 0.2,
            late_round: 7,
            late_research_penalty: 0.2,
        }
    }
}

impl ActionPrior for ContextualPrior {
    fn score<P>(&self, action: &MacroAction<P>, context: Option<&PlanningContext>) -> f64 {
        let Some(ctx) = context else {
            return action.prior.clamp(0.0, 1.0);
        };

        let danger = ctx.border_danger();
        let aggression = ctx.aggression();
        let base = action.kind.base_weight();

        let shifted = match action.kind {
            ActionKind::Build | ActionKind::Upgrade => {
                base + self.danger_weight * danger + self.aggression_weight * aggression
            }
            ActionKind::Explore | ActionKind::Influence => base - self.danger_weight * danger,
            ActionKind::Research => match ctx.round {
                Some(round) if round >= self.late_round => base - self.late_research_penalty,
                _ => base,
            },
            ActionKind::Pass => return 0.0,
            ActionKind::MoveFight | ActionKind::Diplomacy => base,
        };
        shifted.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;
    use crate::rules::context::{OpponentProfile, OpponentTag, ThreatMap};

    fn action(kind: ActionKind) -> MacroAction<()> {
        MacroAction::new(kind, ()).with_prior(0.77)
    }

    #[test]
    fn test_no_context_keeps_engine_prior() {
        let prior = ContextualPrior::default();
        assert_eq!(prior.score(&action(ActionKind::Explore), None), 0.77);
        assert_eq!(EnginePrior.score(&action(ActionKind::Explore), None), 0.77);
    }

    #[test]
    fn test_empty_context_uses_base_weights() {
        let prior = ContextualPrior::default();
        let ctx = PlanningContext::new();
        for kind in ActionKind::ALL {
            assert_eq!(prior.score(&action(kind), Some(&ctx)), kind.base_weight());
        }
    }

    #[test]
    fn test_danger_shifts_toward_defense() {
        let prior = ContextualPrior::default();
        let ctx = PlanningContext::new()
            .with_threat(ThreatMap::new().with_danger(PlayerId::new(1), 1.0));

        assert!(prior.score(&action(ActionKind::Build), Some(&ctx)) > ActionKind::Build.base_weight());
        assert!(prior.score(&action(ActionKind::Upgrade), Some(&ctx)) > ActionKind::Upgrade.base_weight());
        assert!(prior.score(&action(ActionKind::Explore), Some(&ctx)) < ActionKind::Explore.base_weight());
        assert_eq!(prior.score(&action(ActionKind::Pass), Some(&ctx)), 0.0);
    }

    #[test]
    fn test_rusher_raises_build_and_scores_stay_in_range() {
        let prior = ContextualPrior::default();
        let ctx = PlanningContext::new()
            .with_opponent(OpponentProfile::new(PlayerId::new(1)).with_tag(OpponentTag::Rusher))
            .with_threat(ThreatMap::new().with_danger(PlayerId::new(1), 1.0));

        let build = prior.score(&action(ActionKind::Build), Some(&ctx));
        assert!(build > 0.9 && build <= 1.0);
        for kind in ActionKind::ALL {
            assert!((0.0..=1.0).contains(&prior.score(&action(kind), Some(&ctx))));
        }
    }

    #[test]
    fn test_late_rounds_discount_research() {
        let prior = ContextualPrior::default();
        let early = PlanningContext::new().with_round(2);
        let late = PlanningContext::new().with_round(8);
        assert!(
            prior.score(&action(ActionKind::Research), Some(&late))
                < prior.score(&action(ActionKind::Research), Some(&early))
        );
    }
}
