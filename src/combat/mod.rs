//! Stochastic fleet battles.
//!
//! A battle pits an attacking [`Combatant`] against a defending one. Dice are
//! drawn from a single seeded stream so the same [`CombatConfig`] always
//! resolves the same way.

pub mod config;
pub mod dice;
pub mod estimate;
pub mod resolver;
pub mod ship;
pub mod trace;
pub mod weapon;

pub use config::{CombatConfig, RuleToggles, TargetingPolicy};
pub use dice::{to_hit_threshold, Dice, ScriptedDice, MAX_THRESHOLD, MIN_THRESHOLD};
pub use estimate::{estimate_combat, CombatEstimate};
pub use resolver::{resolve_combat, resolve_combat_with, CombatOutcome, UNCAPPED_ROUND_LIMIT};
pub use ship::{Combatant, PointDefense, Ship, ShipClass, Side, WeaponMount};
pub use trace::{CannonStep, CombatTrace, MissileStep, PointDefenseStep};
pub use weapon::{WeaponKind, WeaponProfile, WeaponTable};
