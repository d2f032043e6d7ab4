//! Skirmish rules engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::state::{Empire, SkirmishState};
use crate::belief::BeliefTracker;
use crate::combat::{resolve_combat, CombatConfig, Combatant, ShipClass, Side, WeaponTable};
use crate::core::{structural_hash, EvaluationError, PlayerId};
use crate::rules::{ActionKind, MacroAction, RulesEngine};

/// Payload of a skirmish macro-action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkirmishAction {
    /// Spend science for one computer level.
    Research,
    Build(ShipClass),
    /// Spend materials for one shield level.
    Upgrade,
    /// Settle a sector expected to hold `tile`.
    Explore { tile: String },
    /// Attack `target`'s fleet, or raid it if it has none.
    MoveFight { target: PlayerId },
    Pass,
}

/// What settling a tile of one category yields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileYield {
    pub materials: u32,
    pub science: u32,
    pub vp_halves: u32,
}

pub const RESEARCH_COST: u32 = 4;
pub const UPGRADE_COST: u32 = 3;
pub const MAX_TECH: u8 = 3;
pub const MAX_SHIELDS: u8 = 2;
pub const MAX_FLEET: usize = 6;
const BATTLE_ROUND_CAP: u32 = 12;

/// Materials needed to build `class`; `None` for classes players cannot build.
#[must_use]
pub fn build_cost(class: ShipClass) -> Option<u32> {
    match class {
        ShipClass::Interceptor => Some(3),
        ShipClass::Cruiser => Some(5),
        ShipClass::Dreadnought => Some(8),
        ShipClass::Starbase | ShipClass::Ancient | ShipClass::Guardian => None,
    }
}

const BUILDABLE: [ShipClass; 3] = [ShipClass::Interceptor, ShipClass::Cruiser, ShipClass::Dreadnought];

/// A compact fleet-and-economy game for exercising the planner end to end.
///
/// Exploration settles whichever tile category the tile bag most likely
/// holds, so a `BeliefTracker` over the bag feeds straight into the rules.
/// Battles go through the combat resolver with a seed derived from the state.
#[derive(Clone, Debug)]
pub struct Skirmish {
    weapons: WeaponTable,
    tile_marginal: BTreeMap<String, f64>,
    tile_yields: BTreeMap<String, TileYield>,
    reputation_halves: u32,
}

impl Default for Skirmish {
    fn default() -> Self {
        let yields = [
            ("rich", TileYield { materials: 3, science: 0, vp_halves: 2 }),
            ("science", TileYield { materials: 0, science: 3, vp_halves: 2 }),
            ("barren", TileYield { materials: 1, science: 0, vp_halves: 0 }),
        ];
        Self {
            weapons: WeaponTable::standard(),
            tile_marginal: yields.iter().map(|(name, _)| (name.to_string(), 1.0)).collect(),
            tile_yields: yields.iter().map(|(name, y)| (name.to_string(), *y)).collect(),
            reputation_halves: 2,
        }
    }
}

impl Skirmish {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weapons(mut self, weapons: WeaponTable) -> Self {
        self.weapons = weapons;
        self
    }

    /// Expected remaining count per tile category.
    #[must_use]
    pub fn with_tile_marginal(mut self, marginal: BTreeMap<String, f64>) -> Self {
        self.tile_marginal = marginal;
        self
    }

    #[must_use]
    pub fn with_tile_yield(mut self, tile: &str, tile_yield: TileYield) -> Self {
        self.tile_yields.insert(tile.to_string(), tile_yield);
        self
    }

    /// Take the tile marginal from `tracker`'s belief about `bag`.
    ///
    /// An unknown bag leaves nothing to explore.
    #[must_use]
    pub fn with_beliefs(self, tracker: &BeliefTracker, bag: &str) -> Self {
        let marginal = tracker.expected_bag(bag).unwrap_or_default();
        self.with_tile_marginal(marginal)
    }

    /// Tile category with the highest expected count. Ties go to the first name.
    #[must_use]
    pub fn most_likely_tile(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (name, &count) in &self.tile_marginal {
            if count.is_finite() && count > 0.0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((name, count));
            }
        }
        best.map(|(name, _)| name)
    }

    fn move_fight_prior(me: &Empire, target: &Empire) -> f64 {
        let mine = me.fleet_strength();
        let theirs = target.fleet_strength();
        let ratio = if mine + theirs > 0.0 { mine / (mine + theirs) } else { 0.5 };
        (2.0 * ActionKind::MoveFight.base_weight() * ratio).clamp(0.0, 1.0)
    }

    fn fight(&self, state: &mut SkirmishState, player: PlayerId, target: PlayerId) {
        let seed = structural_hash(&*state);
        state.battles += 1;

        let (Some(me), Some(them)) = (state.empires.get(player), state.empires.get(target)) else {
            return;
        };
        let attacker_fleet: Vec<_> = me.fleet.iter().filter(|s| s.is_alive()).cloned().collect();
        if attacker_fleet.is_empty() {
            return;
        }
        let defender_fleet: Vec<_> = them.fleet.iter().filter(|s| s.is_alive()).cloned().collect();
        if defender_fleet.is_empty() {
            if let Some(me) = state.empires.get_mut(player) {
                me.vp_halves += self.reputation_halves;
                me.sectors += 1;
            }
            if let Some(them) = state.empires.get_mut(target) {
                them.sectors = them.sectors.saturating_sub(1);
            }
            return;
        }

        let config = CombatConfig::new(
            Combatant::new(player, attacker_fleet),
            Combatant::new(target, defender_fleet),
        )
        .with_weapons(self.weapons.clone())
        .with_round_cap(BATTLE_ROUND_CAP)
        .with_seed(seed);

        let outcome = match resolve_combat(&config) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "skirmish battle rejected");
                return;
            }
        };
        debug!(
            attacker = %player,
            defender = %target,
            winner = ?outcome.winner,
            rounds = outcome.rounds,
            "skirmish battle"
        );

        let halves = |vp: f64| (vp * 2.0).round() as u32;
        let attacker_gain = halves(outcome.defender.destroyed_vp())
            + if outcome.winner == Some(Side::Attacker) { self.reputation_halves } else { 0 };
        let defender_gain = halves(outcome.attacker.destroyed_vp())
            + if outcome.winner == Some(Side::Defender) { self.reputation_halves } else { 0 };

        if let Some(me) = state.empires.get_mut(player) {
            me.fleet = outcome.attacker.ships.iter().filter(|s| s.is_alive()).cloned().collect();
            me.vp_halves += attacker_gain;
        }
        if let Some(them) = state.empires.get_mut(target) {
            them.fleet = outcome.defender.ships.iter().filter(|s| s.is_alive()).cloned().collect();
            them.vp_halves += defender_gain;
        }
    }
}

impl RulesEngine for Skirmish {
    type State = SkirmishState;
    type Payload = SkirmishAction;

    fn candidate_actions(&self, state: &SkirmishState, player: PlayerId) -> Vec<MacroAction<SkirmishAction>> {
        let Some(me) = state.empire(player) else {
            return Vec::new();
        };
        let pass = MacroAction::new(ActionKind::Pass, SkirmishAction::Pass);
        if me.influence == 0 {
            return vec![pass];
        }

        let mut actions = Vec::new();
        if me.science >= RESEARCH_COST && me.tech < MAX_TECH {
            actions.push(MacroAction::new(ActionKind::Research, SkirmishAction::Research));
        }
        if me.fleet.len() < MAX_FLEET {
            for class in BUILDABLE {
                if build_cost(class).is_some_and(|cost| me.materials >= cost) {
                    let prior = ActionKind::Build.base_weight() + 0.05 * f64::from(class as u8);
                    actions.push(MacroAction::new(ActionKind::Build, SkirmishAction::Build(class)).with_prior(prior));
                }
            }
        }
        if me.materials >= UPGRADE_COST && me.shields < MAX_SHIELDS && !me.fleet.is_empty() {
            actions.push(MacroAction::new(ActionKind::Upgrade, SkirmishAction::Upgrade));
        }
        if let Some(tile) = self.most_likely_tile() {
            actions.push(MacroAction::new(
                ActionKind::Explore,
                SkirmishAction::Explore { tile: tile.to_string() },
            ));
        }
        if me.fleet.iter().any(|s| s.is_alive()) {
            for (target, them) in state.empires.rivals(player) {
                actions.push(
                    MacroAction::new(ActionKind::MoveFight, SkirmishAction::MoveFight { target })
                        .with_prior(Self::move_fight_prior(me, them)),
                );
            }
        }
        actions.push(pass);
        actions
    }

    fn apply_action(
        &self,
        state: &SkirmishState,
        player: PlayerId,
        action: &MacroAction<SkirmishAction>,
    ) -> SkirmishState {
        let mut next = state.clone();
        if action.payload == SkirmishAction::Pass {
            return next;
        }
        let Some(me) = next.empires.get_mut(player) else {
            return next;
        };
        if me.influence == 0 {
            return next;
        }
        me.influence -= 1;

        match &action.payload {
            SkirmishAction::Research => {
                if me.science >= RESEARCH_COST && me.tech < MAX_TECH {
                    me.science -= RESEARCH_COST;
                    me.tech += 1;
                    me.refit();
                }
            }
            SkirmishAction::Build(class) => {
                if let Some(cost) = build_cost(*class).filter(|c| me.materials >= *c) {
                    if me.fleet.len() < MAX_FLEET {
                        me.materials -= cost;
                        me.commission(*class);
                    }
                }
            }
            SkirmishAction::Upgrade => {
                if me.materials >= UPGRADE_COST && me.shields < MAX_SHIELDS {
                    me.materials -= UPGRADE_COST;
                    me.shields += 1;
                    me.refit();
                }
            }
            SkirmishAction::Explore { tile } => {
                let gain = self.tile_yields.get(tile).copied().unwrap_or_default();
                me.materials += gain.materials;
                me.science += gain.science;
                me.vp_halves += gain.vp_halves;
                me.sectors += 1;
            }
            SkirmishAction::MoveFight { target } => {
                let target = *target;
                if target != player {
                    self.fight(&mut next, player, target);
                }
            }
            SkirmishAction::Pass => {}
        }
        next
    }

    /// VP lead, fleet strength lead, sectors and banked resources.
    fn evaluate(&self, state: &SkirmishState, player: PlayerId) -> Result<f64, EvaluationError> {
        if state.unevaluable {
            return Err(EvaluationError::Unevaluable("state flagged as unevaluable".into()));
        }
        let me = state
            .empire(player)
            .ok_or_else(|| EvaluationError::Unevaluable(format!("{player} has no empire")))?;

        let score = |e: &Empire| {
            e.vp() + 0.25 * e.fleet_strength() + 0.3 * f64::from(e.sectors) + 0.05 * f64::from(e.materials + e.science)
        };
        let best_rival = state
            .empires
            .rivals(player)
            .map(|(_, e)| score(e))
            .reduce(f64::max)
            .unwrap_or(0.0);
        Ok(score(me) - best_rival)
    }
}
