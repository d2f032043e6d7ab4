//! Optional planning context: round, opponent profiles and border danger.
//!
//! Every field is optional. Missing information contributes nothing, so an
//! empty context scores actions the same as no context at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::belief::{ArchetypeDistribution, BeliefTracker};
use crate::core::PlayerId;

/// Observed play style of an opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpponentTag {
    Balanced,
    /// Early fleet, pressure and fights.
    Rusher,
    /// Economy, sectors and defense.
    Turtle,
    /// Research and upgrade tempo.
    Techer,
    /// Fights when the odds are good, otherwise grows.
    Opportunist,
    /// Skirmishes against weak sectors.
    Raider,
}

impl OpponentTag {
    #[must_use]
    pub fn is_aggressive(self) -> bool {
        matches!(self, OpponentTag::Rusher | OpponentTag::Raider)
    }
}

/// What we know about one opponent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpponentProfile {
    pub player: PlayerId,
    pub tags: Vec<OpponentTag>,
    pub archetypes: Option<ArchetypeDistribution>,
}

impl OpponentProfile {
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            tags: Vec::new(),
            archetypes: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: OpponentTag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn with_archetypes(mut self, archetypes: ArchetypeDistribution) -> Self {
        self.archetypes = Some(archetypes);
        self
    }

    /// How likely this opponent is to start fights, in [0, 1].
    ///
    /// An aggressive tag counts as certainty; otherwise the archetype
    /// posterior's mass on aggressive archetypes is used.
    #[must_use]
    pub fn aggression(&self) -> f64 {
        if self.tags.iter().any(|t| t.is_aggressive()) {
            return 1.0;
        }
        self.archetypes
            .map_or(0.0, |a| a.aggression())
            .clamp(0.0, 1.0)
    }
}

/// Border danger per opponent, each in [0, 1].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatMap {
    danger_by_opponent: BTreeMap<PlayerId, f64>,
}

impl ThreatMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record danger from `opponent`, clamped to [0, 1]. Non-finite values count as 0.
    #[must_use]
    pub fn with_danger(mut self, opponent: PlayerId, danger: f64) -> Self {
        let danger = if danger.is_finite() { danger.clamp(0.0, 1.0) } else { 0.0 };
        self.danger_by_opponent.insert(opponent, danger);
        self
    }

    #[must_use]
    pub fn danger(&self, opponent: PlayerId) -> f64 {
        self.danger_by_opponent.get(&opponent).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn max_danger(&self) -> f64 {
        self.danger_by_opponent.values().copied().fold(0.0, f64::max)
    }
}

/// Inputs for contextual action priors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningContext {
    pub round: Option<u32>,
    pub opponents: Vec<OpponentProfile>,
    pub threat: Option<ThreatMap>,
}

impl PlanningContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }

    #[must_use]
    pub fn with_opponent(mut self, profile: OpponentProfile) -> Self {
        self.opponents.push(profile);
        self
    }

    #[must_use]
    pub fn with_threat(mut self, threat: ThreatMap) -> Self {
        self.threat = Some(threat);
        self
    }

    /// Opponent profiles from a tracker's archetype posteriors, skipping `me`.
    #[must_use]
    pub fn from_beliefs(tracker: &BeliefTracker, me: PlayerId) -> Self {
        let opponents = tracker
            .opponents()
            .filter(|p| *p != me)
            .map(|p| OpponentProfile::new(p).with_archetypes(tracker.posterior(p)))
            .collect();
        Self {
            round: None,
            opponents,
            threat: None,
        }
    }

    /// Highest border danger from any opponent; 0 without a threat map.
    #[must_use]
    pub fn border_danger(&self) -> f64 {
        self.threat.as_ref().map_or(0.0, ThreatMap::max_danger)
    }

    /// Highest aggression among known opponents; 0 without profiles.
    #[must_use]
    pub fn aggression(&self) -> f64 {
        self.opponents
            .iter()
            .map(OpponentProfile::aggression)
            .fold(0.0, f64::max)
    }
}
