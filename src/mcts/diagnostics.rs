//! Per-decision diagnostics: how each root candidate fared and with which parameters.

use serde::{Deserialize, Serialize};

use super::config::{PlannerConfig, TranspositionMode};
use super::stats::SearchStats;
use super::tree::TreeStats;
use crate::rules::{ActionKind, PlanningContext};

/// One expanded root child.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildDiagnostics<P> {
    pub kind: ActionKind,
    pub prior: f64,
    pub visits: u32,
    pub mean_value: f64,
    pub payload: P,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanDiagnostics<P> {
    /// Root children in ranking order.
    pub children: Vec<ChildDiagnostics<P>>,
    pub simulations: u32,
    pub rollout_depth: u32,
    pub seed: u64,
    pub pw_c: f64,
    pub pw_alpha: f64,
    pub prior_scale: f64,
    pub exploration: f64,
    pub transposition: TranspositionMode,
    /// Context the priors were computed with, if any.
    pub context: Option<PlanningContext>,
    pub stats: SearchStats,
    pub tree: TreeStats,
}

impl<P> PlanDiagnostics<P> {
    pub(crate) fn new(
        config: &PlannerConfig,
        context: Option<PlanningContext>,
        children: Vec<ChildDiagnostics<P>>,
        stats: SearchStats,
        tree: TreeStats,
    ) -> Self {
        Self {
            children,
            simulations: config.simulations,
            rollout_depth: config.rollout_depth,
            seed: config.seed,
            pw_c: config.pw_c,
            pw_alpha: config.pw_alpha,
            prior_scale: config.prior_scale,
            exploration: config.exploration,
            transposition: config.transposition,
            context,
            stats,
            tree,
        }
    }

    /// Top-ranked child, if any.
    #[must_use]
    pub fn best(&self) -> Option<&ChildDiagnostics<P>> {
        self.children.first()
    }

    /// Total visits across root children.
    #[must_use]
    pub fn child_visits(&self) -> u32 {
        self.children.iter().map(|c| c.visits).sum()
    }
}

impl<P: Serialize> PlanDiagnostics<P> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
