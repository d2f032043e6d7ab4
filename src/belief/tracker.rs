//! Per-session belief state: opponent signal histories and bag particle filters.

use std::collections::BTreeMap;

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::BeliefConfig;
use super::hmm::{ArchetypeDistribution, ArchetypeModel};
use super::particle::{BagComposition, ParticleSet, ParticleSetState};
use super::signal::{Archetype, Signal};
use crate::core::{structural_hash, ConfigError, PlayerId, SnapshotError};

/// Everything one planning session believes about hidden information.
#[derive(Clone, Debug)]
pub struct BeliefTracker {
    config: BeliefConfig,
    model: ArchetypeModel,
    histories: BTreeMap<PlayerId, Vector<Signal>>,
    bags: BTreeMap<String, ParticleSet>,
}

impl BeliefTracker {
    pub fn new(config: BeliefConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            model: ArchetypeModel::standard(),
            histories: BTreeMap::new(),
            bags: BTreeMap::new(),
        })
    }

    /// Replace the standard archetype model.
    #[must_use]
    pub fn with_model(mut self, model: ArchetypeModel) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BeliefConfig {
        &self.config
    }

    #[must_use]
    pub fn model(&self) -> &ArchetypeModel {
        &self.model
    }

    // === Opponents ===

    /// Append a signal to an opponent's history.
    pub fn observe_signal(&mut self, player: PlayerId, signal: Signal) {
        self.histories.entry(player).or_default().push_back(signal);
    }

    #[must_use]
    pub fn history(&self, player: PlayerId) -> Option<&Vector<Signal>> {
        self.histories.get(&player)
    }

    /// Opponents with at least one observed signal.
    pub fn opponents(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.histories.keys().copied()
    }

    fn signals(&self, player: PlayerId) -> Vec<Signal> {
        self.histories
            .get(&player)
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Archetype posterior for an opponent.
    ///
    /// `rho >= 1` runs standard filtering, smaller values discount older
    /// signals. Negative or NaN `rho` is rejected. An opponent with no
    /// history gets the uniform distribution.
    pub fn enemy_posterior(&self, player: PlayerId, rho: f64) -> Result<ArchetypeDistribution, ConfigError> {
        if rho.is_nan() || rho < 0.0 {
            return Err(ConfigError::InvalidForgetting { rho });
        }
        let signals = self.signals(player);
        if rho >= 1.0 {
            Ok(self.model.posterior(&signals))
        } else {
            self.model.posterior_with_forgetting(&signals, rho)
        }
    }

    /// Archetype posterior using the configured forgetting weight.
    #[must_use]
    pub fn posterior(&self, player: PlayerId) -> ArchetypeDistribution {
        self.enemy_posterior(player, self.config.forgetting)
            .unwrap_or_default()
    }

    /// Most likely archetype at each observed step.
    #[must_use]
    pub fn likely_archetypes(&self, player: PlayerId) -> Vec<Archetype> {
        self.model.viterbi(&self.signals(player))
    }

    // === Bags ===

    /// Start tracking a bag. Does nothing if the bag is already tracked.
    pub fn ensure_bag(&mut self, bag: &str, composition: &BagComposition) -> Result<(), ConfigError> {
        self.ensure_bag_with_hidden(bag, composition, 0)
    }

    /// Start tracking a bag from which `removed` tiles were already taken unseen.
    pub fn ensure_bag_with_hidden(
        &mut self,
        bag: &str,
        composition: &BagComposition,
        removed: u32,
    ) -> Result<(), ConfigError> {
        if self.bags.contains_key(bag) {
            return Ok(());
        }
        let config = self
            .config
            .clone()
            .with_seed(structural_hash(&(self.config.seed, bag)));
        let set = ParticleSet::with_hidden_removals(bag, composition, removed, &config)?;
        debug!(bag, particles = set.particle_count(), removed, "tracking bag");
        self.bags.insert(bag.to_string(), set);
        Ok(())
    }

    fn bag_mut(&mut self, bag: &str) -> Result<&mut ParticleSet, ConfigError> {
        self.bags.get_mut(bag).ok_or_else(|| ConfigError::UnknownBag {
            bag: bag.to_string(),
        })
    }

    pub fn draw_from_bag(&mut self, bag: &str, category: &str) -> Result<(), ConfigError> {
        self.bag_mut(bag)?.update_on_draw(category)
    }

    pub fn peek_bag(&mut self, bag: &str, seen: &[(&str, u32)]) -> Result<(), ConfigError> {
        self.bag_mut(bag)?.update_on_peek(seen)
    }

    pub fn reveal_in_bag(&mut self, bag: &str, slot: &str, category: &str) -> Result<(), ConfigError> {
        self.bag_mut(bag)?.update_on_reveal(slot, category)
    }

    /// Expected remaining composition of a tracked bag.
    #[must_use]
    pub fn expected_bag(&self, bag: &str) -> Option<BTreeMap<String, f64>> {
        self.bags.get(bag).map(ParticleSet::marginal_bag)
    }

    #[must_use]
    pub fn bag(&self, bag: &str) -> Option<&ParticleSet> {
        self.bags.get(bag)
    }

    pub fn bags(&self) -> impl Iterator<Item = (&str, &ParticleSet)> {
        self.bags.iter().map(|(k, v)| (k.as_str(), v))
    }

    // === Snapshots ===

    /// Summary snapshot: histories, expected compositions and particle counts.
    #[must_use]
    pub fn snapshot(&self) -> BeliefSnapshot {
        BeliefSnapshot {
            histories: self.history_records(),
            bags: self
                .bags
                .iter()
                .map(|(bag, set)| BagSummary {
                    bag: bag.clone(),
                    expected: set.marginal_bag(),
                    particles: set.particle_count(),
                })
                .collect(),
        }
    }

    /// Rebuild an equivalent tracker from a summary. Each bag restarts from its
    /// expected composition rounded to whole tiles.
    pub fn from_snapshot(snapshot: &BeliefSnapshot, config: BeliefConfig) -> Result<Self, ConfigError> {
        let mut tracker = Self::new(config)?;
        for record in &snapshot.histories {
            tracker
                .histories
                .insert(record.player, record.signals.iter().copied().collect());
        }
        for summary in &snapshot.bags {
            let composition: BagComposition = summary
                .expected
                .iter()
                .map(|(category, expected)| (category.clone(), expected.round().max(0.0) as u32))
                .collect();
            let config = tracker
                .config
                .clone()
                .with_particles(summary.particles)
                .with_seed(structural_hash(&(tracker.config.seed, summary.bag.as_str())));
            let set = ParticleSet::new(summary.bag.as_str(), &composition, &config)?;
            tracker.bags.insert(summary.bag.clone(), set);
        }
        Ok(tracker)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn from_json(json: &str, config: BeliefConfig) -> Result<Self, SnapshotError> {
        let snapshot: BeliefSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot, config)?)
    }

    /// Lossless encoding of every particle, pin, weight and RNG position.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let full = FullSnapshot {
            config: self.config.clone(),
            model: self.model.clone(),
            histories: self.history_records(),
            bags: self.bags.values().map(ParticleSet::to_state).collect(),
        };
        Ok(bincode::serialize(&full)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let full: FullSnapshot = bincode::deserialize(bytes)?;
        full.config.validate()?;
        let mut bags = BTreeMap::new();
        for state in full.bags {
            let set = ParticleSet::from_state(state)?;
            bags.insert(set.bag().to_string(), set);
        }
        Ok(Self {
            config: full.config,
            model: full.model,
            histories: full
                .histories
                .into_iter()
                .map(|r| (r.player, r.signals.into_iter().collect()))
                .collect(),
            bags,
        })
    }

    fn history_records(&self) -> Vec<OpponentHistory> {
        self.histories
            .iter()
            .map(|(player, signals)| OpponentHistory {
                player: *player,
                signals: signals.iter().copied().collect(),
            })
            .collect()
    }
}

/// Observed signals of one opponent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpponentHistory {
    pub player: PlayerId,
    pub signals: Vec<Signal>,
}

/// Expected composition of one bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BagSummary {
    pub bag: String,
    pub expected: BTreeMap<String, f64>,
    pub particles: usize,
}

/// Compact, human-readable belief summary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefSnapshot {
    pub histories: Vec<OpponentHistory>,
    pub bags: Vec<BagSummary>,
}

#[derive(Serialize, Deserialize)]
struct FullSnapshot {
    config: BeliefConfig,
    model: ArchetypeModel,
    histories: Vec<OpponentHistory>,
    bags: Vec<ParticleSetState>,
}
