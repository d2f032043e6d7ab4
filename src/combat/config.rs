//! Battle configuration and optional rule toggles.

use serde::{Deserialize, Serialize};

use super::ship::{Combatant, Side};
use super::weapon::WeaponTable;
use crate::core::ConfigError;

/// How hits are assigned among eligible enemy ships.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingPolicy {
    /// Lowest remaining hull first, to secure kills.
    #[default]
    FocusFire,
    /// Slowest ship first.
    LowestInitiative,
    /// Fastest ship first.
    HighestInitiative,
}

/// Optional rules and limits for a battle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleToggles {
    /// Ships on both sides sharing an initiative roll before either applies damage.
    pub simultaneous_same_initiative: bool,
    /// Defenders with point defense may intercept missiles.
    pub point_defense: bool,
    /// Rift weapons participate in the cannon phase.
    pub rift_cannons: bool,
    /// Antimatter damage beyond a destroyed target spills onto further ships.
    pub antimatter_splitter: bool,
    /// Stop after this many rounds even if both sides survive.
    pub round_cap: Option<u32>,
    pub targeting: TargetingPolicy,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            simultaneous_same_initiative: true,
            point_defense: false,
            rift_cannons: false,
            antimatter_splitter: false,
            round_cap: None,
            targeting: TargetingPolicy::FocusFire,
        }
    }
}

/// Everything needed to resolve one battle deterministically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    pub attacker: Combatant,
    pub defender: Combatant,
    pub weapons: WeaponTable,
    pub rules: RuleToggles,
    /// All dice in the battle are drawn from this seed.
    pub seed: u64,
    /// Record missile and point-defense sub-steps.
    pub record_trace: bool,
}

impl CombatConfig {
    /// Standard weapon table, default rules, seed 0.
    #[must_use]
    pub fn new(attacker: Combatant, defender: Combatant) -> Self {
        Self {
            attacker,
            defender,
            weapons: WeaponTable::standard(),
            rules: RuleToggles::default(),
            seed: 0,
            record_trace: false,
        }
    }

    #[must_use]
    pub fn with_weapons(mut self, weapons: WeaponTable) -> Self {
        self.weapons = weapons;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RuleToggles) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_round_cap(mut self, rounds: u32) -> Self {
        self.rules.round_cap = Some(rounds);
        self
    }

    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }

    /// Check fleets and weapon table before resolving.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weapons.validate()?;
        self.attacker.validate(Side::Attacker, &self.weapons)?;
        self.defender.validate(Side::Defender, &self.weapons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ship::ShipClass;
    use crate::core::PlayerId;

    fn duel() -> CombatConfig {
        CombatConfig::new(
            Combatant::new(PlayerId::new(0), vec![ShipClass::Interceptor.default_design()]),
            Combatant::new(PlayerId::new(1), vec![ShipClass::Cruiser.default_design()]),
        )
    }

    #[test]
    fn test_defaults() {
        let rules = RuleToggles::default();
        assert!(rules.simultaneous_same_initiative);
        assert!(!rules.point_defense);
        assert!(!rules.rift_cannons);
        assert!(!rules.antimatter_splitter);
        assert_eq!(rules.round_cap, None);
        assert_eq!(rules.targeting, TargetingPolicy::FocusFire);
    }

    #[test]
    fn test_builder_pattern() {
        let config = duel().with_seed(9).with_round_cap(3).with_trace();
        assert_eq!(config.seed, 9);
        assert_eq!(config.rules.round_cap, Some(3));
        assert!(config.record_trace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_defender_rejected() {
        let mut config = duel();
        config.defender.ships.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyFleet {
                side: "defender".into()
            })
        );
    }

    #[test]
    fn test_serialization() {
        let config = duel().with_seed(5);
        let json = serde_json::to_string(&config).unwrap();
        let back: CombatConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
