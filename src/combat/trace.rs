//! Step-by-step record of a battle for diagnostics and reports.

use serde::{Deserialize, Serialize};

use super::ship::Side;

/// One ship's missile salvo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissileStep {
    pub round: u32,
    pub initiative: u8,
    pub side: Side,
    pub ship_index: usize,
    /// Missiles launched.
    pub fired: u8,
    /// Missiles that reached the damage roll and hit.
    pub hits: u8,
}

/// Point-defense response to one incoming salvo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDefenseStep {
    pub round: u32,
    pub initiative: u8,
    /// Side whose point defense fired.
    pub side: Side,
    pub incoming: u8,
    pub prevented: u8,
}

/// One initiative step of cannon fire for one side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CannonStep {
    pub round: u32,
    pub initiative: u8,
    pub side: Side,
    pub dice: u32,
    pub hull_removed: i32,
}

/// Collected sub-steps of a resolved battle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatTrace {
    pub missile_steps: Vec<MissileStep>,
    pub point_defense_steps: Vec<PointDefenseStep>,
    pub cannon_steps: Vec<CannonStep>,
}

impl CombatTrace {
    /// Total missiles intercepted across the battle.
    #[must_use]
    pub fn total_prevented(&self) -> u32 {
        self.point_defense_steps
            .iter()
            .map(|s| u32::from(s.prevented))
            .sum()
    }

    /// (initiative, side) pairs in missile firing order.
    #[must_use]
    pub fn missile_order(&self) -> Vec<(u8, Side)> {
        self.missile_steps
            .iter()
            .map(|s| (s.initiative, s.side))
            .collect()
    }
}
