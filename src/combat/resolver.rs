//! Battle resolution.
//!
//! Each round runs a missile phase and then a cannon phase. Within a phase
//! ships fire in descending initiative. Ships sharing an initiative either
//! roll together before any damage lands (simultaneous rule) or fire one
//! side after the other, defender first.
//!
//! Dice are rolled first and assigned afterwards: a rolled face hits any
//! living enemy whose shields it beats, and the targeting policy picks
//! among those. Missiles and rift cannons ignore shields.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::{CombatConfig, RuleToggles, TargetingPolicy};
use super::dice::{to_hit_threshold, Dice};
use super::ship::{Combatant, PointDefense, Ship, Side, WeaponMount};
use super::trace::{CannonStep, CombatTrace, MissileStep, PointDefenseStep};
use super::weapon::{WeaponKind, WeaponTable};
use crate::core::{ConfigError, GameRng, PlayerId};

/// Rounds fought when no round cap is set. Seeded dice end a battle long
/// before this since a natural 6 always hits; a scripted source that never
/// hits would otherwise loop forever.
pub const UNCAPPED_ROUND_LIMIT: u32 = 1_000;

/// Final state of a resolved battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub attacker: Combatant,
    pub defender: Combatant,
    /// `None` when both sides died or the round cap (or
    /// [`UNCAPPED_ROUND_LIMIT`]) was reached.
    pub winner: Option<Side>,
    pub rounds: u32,
    pub attacker_losses: usize,
    pub defender_losses: usize,
    pub trace: Option<CombatTrace>,
}

impl CombatOutcome {
    /// The fleet that fought on `side`.
    #[must_use]
    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Attacker => &self.attacker,
            Side::Defender => &self.defender,
        }
    }

    /// Owner of the winning fleet.
    #[must_use]
    pub fn winner_owner(&self) -> Option<PlayerId> {
        self.winner.map(|side| self.combatant(side).owner)
    }

    /// Destroyed-ship VP gained by the attacker minus VP gained by the defender.
    #[must_use]
    pub fn vp_swing(&self) -> f64 {
        self.defender.destroyed_vp() - self.attacker.destroyed_vp()
    }
}

/// Resolve a battle with dice drawn from `config.seed`.
pub fn resolve_combat(config: &CombatConfig) -> Result<CombatOutcome, ConfigError> {
    let mut rng = GameRng::new(config.seed);
    resolve_combat_with(config, &mut rng)
}

/// Resolve a battle with an explicit dice source.
pub fn resolve_combat_with<D: Dice>(
    config: &CombatConfig,
    dice: &mut D,
) -> Result<CombatOutcome, ConfigError> {
    config.validate()?;

    let mut battle = Battle {
        fleets: [config.attacker.clone(), config.defender.clone()],
        weapons: &config.weapons,
        rules: &config.rules,
        dice,
        trace: config.record_trace.then(CombatTrace::default),
        round: 0,
    };
    battle.run();
    Ok(battle.finish())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Missile,
    Cannon,
}

/// A rolled die waiting to be assigned to a target.
#[derive(Clone, Copy, Debug)]
struct Shot {
    face: u8,
    base: u8,
    computer: u8,
    damage: u8,
    ignores_shields: bool,
    splits: bool,
}

impl Shot {
    fn hits(&self, target: &Ship) -> bool {
        let shield = if self.ignores_shields { 0 } else { target.shield };
        self.face >= to_hit_threshold(self.base, self.computer, shield)
    }
}

#[derive(Debug, Default)]
struct Volley {
    shots: Vec<Shot>,
    /// Damage dealt back to the firing ships (ship index, hull).
    backlash: Vec<(usize, i32)>,
    dice: u32,
}

struct Battle<'a, D: Dice> {
    fleets: [Combatant; 2],
    weapons: &'a WeaponTable,
    rules: &'a RuleToggles,
    dice: &'a mut D,
    trace: Option<CombatTrace>,
    round: u32,
}

impl<D: Dice> Battle<'_, D> {
    fn run(&mut self) {
        while self.both_alive() {
            match self.rules.round_cap {
                Some(cap) if self.round >= cap => break,
                None if self.round >= UNCAPPED_ROUND_LIMIT => {
                    warn!(rounds = self.round, "battle hit the uncapped round limit");
                    break;
                }
                _ => {}
            }
            if !self.any_armed() {
                debug!(round = self.round, "no ship can deal damage, stopping");
                break;
            }
            self.round += 1;
            self.run_phase(Phase::Missile);
            self.run_phase(Phase::Cannon);
        }
    }

    fn finish(self) -> CombatOutcome {
        let [attacker, defender] = self.fleets;
        let winner = match (attacker.is_alive(), defender.is_alive()) {
            (true, false) => Some(Side::Attacker),
            (false, true) => Some(Side::Defender),
            _ => None,
        };
        let outcome = CombatOutcome {
            attacker_losses: attacker.losses(),
            defender_losses: defender.losses(),
            attacker,
            defender,
            winner,
            rounds: self.round,
            trace: self.trace,
        };
        debug!(
            rounds = outcome.rounds,
            winner = ?outcome.winner,
            attacker_losses = outcome.attacker_losses,
            defender_losses = outcome.defender_losses,
            "combat resolved"
        );
        outcome
    }

    fn both_alive(&self) -> bool {
        self.fleets.iter().all(Combatant::is_alive)
    }

    fn any_armed(&self) -> bool {
        self.fleets
            .iter()
            .flat_map(|f| f.ships.iter())
            .filter(|s| s.is_alive())
            .any(|s| self.can_fire(s, Phase::Missile) || self.can_fire(s, Phase::Cannon))
    }

    fn cannon_active(&self, mount: &WeaponMount) -> bool {
        if mount.count == 0 || mount.kind == WeaponKind::Missile {
            return false;
        }
        self.weapons
            .get(mount.kind)
            .map_or(false, |p| !p.is_rift || self.rules.rift_cannons)
    }

    fn can_fire(&self, ship: &Ship, phase: Phase) -> bool {
        match phase {
            Phase::Missile => ship.missiles > 0,
            Phase::Cannon => ship.weapons.iter().any(|m| self.cannon_active(m)),
        }
    }

    /// Distinct initiatives with something to fire, fastest first.
    fn initiative_steps(&self, phase: Phase) -> Vec<u8> {
        let mut steps: Vec<u8> = self
            .fleets
            .iter()
            .flat_map(|f| f.ships.iter())
            .filter(|s| s.is_alive() && self.can_fire(s, phase))
            .map(|s| s.initiative)
            .collect();
        steps.sort_unstable_by_key(|i| Reverse(*i));
        steps.dedup();
        steps
    }

    fn run_phase(&mut self, phase: Phase) {
        for initiative in self.initiative_steps(phase) {
            if !self.both_alive() {
                return;
            }
            if self.rules.simultaneous_same_initiative {
                let attack = self.roll_volley(Side::Attacker, initiative, phase);
                let defend = self.roll_volley(Side::Defender, initiative, phase);
                self.land_volley(attack, Side::Attacker, initiative, phase);
                self.land_volley(defend, Side::Defender, initiative, phase);
            } else {
                for side in [Side::Defender, Side::Attacker] {
                    if !self.both_alive() {
                        break;
                    }
                    let volley = self.roll_volley(side, initiative, phase);
                    self.land_volley(volley, side, initiative, phase);
                }
            }
        }
    }

    fn roll_volley(&mut self, side: Side, initiative: u8, phase: Phase) -> Volley {
        let mut volley = Volley::default();
        for idx in 0..self.fleets[side.index()].ships.len() {
            let ship = &self.fleets[side.index()].ships[idx];
            if !ship.is_alive() || ship.initiative != initiative {
                continue;
            }
            match phase {
                Phase::Missile => self.fire_missiles(side, idx, initiative, &mut volley),
                Phase::Cannon => self.fire_cannons(side, idx, &mut volley),
            }
        }
        volley
    }

    fn fire_missiles(&mut self, side: Side, idx: usize, initiative: u8, volley: &mut Volley) {
        let (count, computer) = {
            let ship = &mut self.fleets[side.index()].ships[idx];
            let count = ship.missiles;
            // Missiles are one-shot.
            ship.missiles = 0;
            (count, ship.computer)
        };
        let Some(profile) = self.weapons.get(WeaponKind::Missile).copied() else {
            return;
        };
        if count == 0 {
            return;
        }

        let defense = if self.rules.point_defense {
            self.fleets[side.opponent().index()]
                .point_defense
                .filter(|pd| pd.dice > 0)
        } else {
            None
        };
        let threshold = to_hit_threshold(profile.base_to_hit, computer, 0);

        let mut prevented = 0u8;
        let mut hits = 0u8;
        for _ in 0..count {
            if let Some(pd) = defense {
                if self.intercepts(pd) {
                    prevented += 1;
                    continue;
                }
            }
            let face = self.dice.roll();
            if face >= threshold {
                hits += 1;
            }
            volley.shots.push(Shot {
                face,
                base: profile.base_to_hit,
                computer,
                damage: profile.damage,
                ignores_shields: true,
                splits: false,
            });
        }
        volley.dice += u32::from(count);

        if let Some(trace) = self.trace.as_mut() {
            trace.missile_steps.push(MissileStep {
                round: self.round,
                initiative,
                side,
                ship_index: idx,
                fired: count,
                hits,
            });
            if defense.is_some() {
                trace.point_defense_steps.push(PointDefenseStep {
                    round: self.round,
                    initiative,
                    side: side.opponent(),
                    incoming: count,
                    prevented,
                });
            }
        }
    }

    /// Roll point-defense dice against one missile.
    fn intercepts(&mut self, pd: PointDefense) -> bool {
        let threshold = to_hit_threshold(pd.base, pd.computer, 0);
        (0..pd.dice).any(|_| self.dice.roll() >= threshold)
    }

    fn fire_cannons(&mut self, side: Side, idx: usize, volley: &mut Volley) {
        let ship = &self.fleets[side.index()].ships[idx];
        let computer = ship.computer;
        let mounts: Vec<WeaponMount> = ship
            .weapons
            .iter()
            .filter(|m| self.cannon_active(m))
            .copied()
            .collect();

        for mount in mounts {
            let Some(profile) = self.weapons.get(mount.kind).copied() else {
                continue;
            };
            for _ in 0..mount.count {
                let face = self.dice.roll();
                volley.dice += 1;
                if profile.is_rift {
                    if face == 1 {
                        volley.backlash.push((idx, 1));
                    }
                    volley.shots.push(Shot {
                        face,
                        base: profile.base_to_hit,
                        computer: 0,
                        damage: profile.damage,
                        ignores_shields: true,
                        splits: false,
                    });
                } else {
                    volley.shots.push(Shot {
                        face,
                        base: profile.base_to_hit,
                        computer,
                        damage: profile.damage,
                        ignores_shields: false,
                        splits: self.rules.antimatter_splitter && mount.kind == WeaponKind::Antimatter,
                    });
                }
            }
        }
    }

    fn land_volley(&mut self, volley: Volley, shooter: Side, initiative: u8, phase: Phase) {
        let policy = self.rules.targeting;
        let targets = &mut self.fleets[shooter.opponent().index()];

        let mut removed = 0;
        for shot in &volley.shots {
            let mut remaining = i32::from(shot.damage);
            while remaining > 0 {
                let Some(t) = pick_target(&targets.ships, shot, policy) else {
                    break;
                };
                let dealt = targets.ships[t].take_damage(remaining);
                removed += dealt;
                if !shot.splits || dealt == 0 {
                    break;
                }
                remaining -= dealt;
            }
        }

        let own = &mut self.fleets[shooter.index()];
        for (idx, damage) in &volley.backlash {
            own.ships[*idx].take_damage(*damage);
        }

        if phase == Phase::Cannon && volley.dice > 0 {
            if let Some(trace) = self.trace.as_mut() {
                trace.cannon_steps.push(CannonStep {
                    round: self.round,
                    initiative,
                    side: shooter,
                    dice: volley.dice,
                    hull_removed: removed,
                });
            }
        }
    }
}

/// Choose which eligible ship a shot lands on.
fn pick_target(ships: &[Ship], shot: &Shot, policy: TargetingPolicy) -> Option<usize> {
    let candidates = ships
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_alive() && shot.hits(s));
    let chosen = match policy {
        TargetingPolicy::FocusFire => {
            candidates.min_by_key(|(i, s)| (s.hull, Reverse(s.initiative), *i))
        }
        TargetingPolicy::LowestInitiative => {
            candidates.min_by_key(|(i, s)| (s.initiative, s.hull, *i))
        }
        TargetingPolicy::HighestInitiative => {
            candidates.min_by_key(|(i, s)| (Reverse(s.initiative), s.hull, *i))
        }
    };
    chosen.map(|(i, _)| i)
}
