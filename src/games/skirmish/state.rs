//! Skirmish state: one empire per seat.

use serde::{Deserialize, Serialize};

use crate::combat::{Ship, ShipClass};
use crate::core::{PlayerId, PlayerMap};

/// Resources, technology and fleet of one player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Empire {
    pub materials: u32,
    pub science: u32,
    /// Action discs left this round. Every action except pass spends one.
    pub influence: u8,
    /// Computer level fitted to every ship (0..=3).
    pub tech: u8,
    /// Shield level fitted to every ship (0..=2).
    pub shields: u8,
    pub sectors: u32,
    /// Victory points in half-point units, since an interceptor is worth 0.5.
    pub vp_halves: u32,
    /// Surviving ships.
    pub fleet: Vec<Ship>,
}

impl Default for Empire {
    fn default() -> Self {
        Self {
            materials: 6,
            science: 4,
            influence: 4,
            tech: 0,
            shields: 0,
            sectors: 1,
            vp_halves: 0,
            fleet: vec![ShipClass::Interceptor.default_design()],
        }
    }
}

impl Empire {
    /// Victory points.
    #[must_use]
    pub fn vp(&self) -> f64 {
        f64::from(self.vp_halves) / 2.0
    }

    /// Rough fleet power: hull plus dice per ship, boosted by computers and shields.
    #[must_use]
    pub fn fleet_strength(&self) -> f64 {
        self.fleet
            .iter()
            .filter(|s| s.is_alive())
            .map(|s| {
                let dice: u32 = s.weapons.iter().map(|m| u32::from(m.count)).sum();
                let base = f64::from(s.hull.max(0)) + f64::from(dice) + f64::from(s.missiles);
                base * (1.0 + 0.25 * f64::from(s.computer) + 0.25 * f64::from(s.shield))
            })
            .sum()
    }

    /// Add a ship fitted with the empire's current technology.
    pub fn commission(&mut self, class: ShipClass) {
        let ship = class
            .default_design()
            .with_computer(self.tech)
            .with_shield(self.shields);
        self.fleet.push(ship);
    }

    pub(crate) fn refit(&mut self) {
        for ship in &mut self.fleet {
            ship.computer = self.tech;
            ship.shield = self.shields;
        }
    }
}

/// Full skirmish state. Equal states hash equally, which the planner relies on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkirmishState {
    pub round: u32,
    pub empires: PlayerMap<Empire>,
    /// Battles fought so far; part of every battle seed.
    pub battles: u32,
    /// Marks a state the evaluator must refuse to score.
    pub unevaluable: bool,
}

impl SkirmishState {
    /// `player_count` default empires in round 1.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            round: 1,
            empires: PlayerMap::new(player_count, |_| Empire::default()),
            battles: 0,
            unevaluable: false,
        }
    }

    #[must_use]
    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    /// Replace one seat's empire. Unknown seats are ignored.
    #[must_use]
    pub fn with_empire(mut self, player: PlayerId, empire: Empire) -> Self {
        if let Some(slot) = self.empires.get_mut(player) {
            *slot = empire;
        }
        self
    }

    #[must_use]
    pub fn flagged_unevaluable(mut self) -> Self {
        self.unevaluable = true;
        self
    }

    #[must_use]
    pub fn empire(&self, player: PlayerId) -> Option<&Empire> {
        self.empires.get(player)
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.empires.player_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_empire() {
        let empire = Empire::default();
        assert_eq!(empire.fleet.len(), 1);
        assert_eq!(empire.vp(), 0.0);
        // interceptor: hull 1 + 1 ion die
        assert_eq!(empire.fleet_strength(), 2.0);
    }

    #[test]
    fn test_commission_uses_current_tech() {
        let mut empire = Empire { tech: 2, shields: 1, ..Empire::default() };
        empire.commission(ShipClass::Cruiser);
        let cruiser = &empire.fleet[1];
        assert_eq!(cruiser.computer, 2);
        assert_eq!(cruiser.shield, 1);
        assert!(empire.fleet_strength() > 2.0 + 4.0);
    }

    #[test]
    fn test_with_empire_ignores_unknown_seat() {
        let state = SkirmishState::new(2).with_empire(PlayerId::new(5), Empire { materials: 99, ..Empire::default() });
        assert_eq!(state, SkirmishState::new(2));
        assert_eq!(state.player_count(), 2);
    }
}
