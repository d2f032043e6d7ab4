//! Ships, fleets and point-defense capability.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::weapon::{WeaponKind, WeaponTable};
use crate::core::{ConfigError, PlayerId};

/// Which side of a battle a combatant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    /// The other side.
    #[must_use]
    pub fn opponent(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Attacker => 0,
            Side::Defender => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Attacker => f.write_str("attacker"),
            Side::Defender => f.write_str("defender"),
        }
    }
}

/// Hull class of a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    Interceptor,
    Cruiser,
    Dreadnought,
    Starbase,
    Ancient,
    Guardian,
}

impl ShipClass {
    /// Victory points awarded for destroying a ship of this class.
    #[must_use]
    pub fn vp(self) -> f64 {
        match self {
            ShipClass::Interceptor => 0.5,
            ShipClass::Cruiser | ShipClass::Starbase | ShipClass::Ancient => 1.0,
            ShipClass::Dreadnought | ShipClass::Guardian => 2.0,
        }
    }

    /// Unupgraded blueprint for this class.
    #[must_use]
    pub fn default_design(self) -> Ship {
        match self {
            ShipClass::Interceptor => Ship::new(self, 3, 1).with_weapon(WeaponKind::Ion, 1),
            ShipClass::Cruiser => Ship::new(self, 2, 2).with_weapon(WeaponKind::Ion, 2),
            ShipClass::Dreadnought => Ship::new(self, 1, 3).with_weapon(WeaponKind::Ion, 3),
            ShipClass::Starbase => Ship::new(self, 4, 2).with_weapon(WeaponKind::Ion, 2),
            ShipClass::Ancient => Ship::new(self, 2, 2)
                .with_computer(1)
                .with_shield(1)
                .with_weapon(WeaponKind::Ion, 2),
            ShipClass::Guardian => Ship::new(self, 3, 4)
                .with_computer(2)
                .with_shield(1)
                .with_weapon(WeaponKind::Ion, 3),
        }
    }

    fn name(self) -> &'static str {
        match self {
            ShipClass::Interceptor => "interceptor",
            ShipClass::Cruiser => "cruiser",
            ShipClass::Dreadnought => "dreadnought",
            ShipClass::Starbase => "starbase",
            ShipClass::Ancient => "ancient",
            ShipClass::Guardian => "guardian",
        }
    }
}

impl std::fmt::Display for ShipClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A number of identical weapon dice of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponMount {
    pub kind: WeaponKind,
    pub count: u8,
}

/// One ship as it enters (and leaves) a battle.
///
/// A ship with `hull <= 0` is dead: it no longer fires but stays in its
/// fleet so losses can be counted afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    pub class: ShipClass,
    pub initiative: u8,
    pub hull: i32,
    pub max_hull: i32,
    pub computer: u8,
    pub shield: u8,
    pub weapons: SmallVec<[WeaponMount; 4]>,
    pub missiles: u8,
}

impl Ship {
    /// A ship with the given initiative and hull, no weapons, computers or shields.
    #[must_use]
    pub fn new(class: ShipClass, initiative: u8, hull: i32) -> Self {
        Self {
            class,
            initiative,
            hull,
            max_hull: hull,
            computer: 0,
            shield: 0,
            weapons: SmallVec::new(),
            missiles: 0,
        }
    }

    #[must_use]
    pub fn with_computer(mut self, computer: u8) -> Self {
        self.computer = computer;
        self
    }

    #[must_use]
    pub fn with_shield(mut self, shield: u8) -> Self {
        self.shield = shield;
        self
    }

    #[must_use]
    pub fn with_missiles(mut self, missiles: u8) -> Self {
        self.missiles = missiles;
        self
    }

    /// Replace all mounts with a single weapon kind.
    #[must_use]
    pub fn armed_with(mut self, kind: WeaponKind, count: u8) -> Self {
        self.weapons = smallvec![WeaponMount { kind, count }];
        self
    }

    /// Add dice of a weapon kind, merging with an existing mount.
    #[must_use]
    pub fn with_weapon(mut self, kind: WeaponKind, count: u8) -> Self {
        match self.weapons.iter_mut().find(|m| m.kind == kind) {
            Some(mount) => mount.count = mount.count.saturating_add(count),
            None => self.weapons.push(WeaponMount { kind, count }),
        }
        self
    }

    /// Remove every cannon mount.
    #[must_use]
    pub fn unarmed(mut self) -> Self {
        self.weapons.clear();
        self
    }

    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hull > 0
    }

    /// Dice of a given kind mounted on this ship.
    #[must_use]
    pub fn weapon_count(&self, kind: WeaponKind) -> u8 {
        self.weapons
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.count)
            .sum()
    }

    /// Apply damage, flooring hull at zero. Returns the hull actually removed.
    pub(crate) fn take_damage(&mut self, damage: i32) -> i32 {
        let removed = damage.min(self.hull).max(0);
        self.hull -= removed;
        removed
    }

    fn validate(&self, weapons: &WeaponTable) -> Result<(), ConfigError> {
        if self.hull > self.max_hull {
            return Err(ConfigError::HullAboveMaximum {
                ship: self.class.to_string(),
                hull: self.hull,
                max_hull: self.max_hull,
            });
        }
        let missing = self
            .weapons
            .iter()
            .filter(|m| m.count > 0)
            .map(|m| m.kind)
            .chain((self.missiles > 0).then_some(WeaponKind::Missile))
            .find(|kind| weapons.get(*kind).is_none());
        match missing {
            Some(kind) => Err(ConfigError::MissingWeaponProfile {
                ship: self.class.to_string(),
                weapon: kind.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Missile interception capability of a fleet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointDefense {
    /// Interception dice rolled against each incoming missile.
    pub dice: u8,
    /// Die face needed to intercept before the computer bonus.
    pub base: u8,
    /// Bonus subtracted from `base`.
    pub computer: u8,
}

/// An owner and its fleet in one battle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combatant {
    pub owner: PlayerId,
    pub ships: Vec<Ship>,
    pub point_defense: Option<PointDefense>,
}

impl Combatant {
    #[must_use]
    pub fn new(owner: PlayerId, ships: Vec<Ship>) -> Self {
        Self {
            owner,
            ships,
            point_defense: None,
        }
    }

    #[must_use]
    pub fn with_point_defense(mut self, point_defense: PointDefense) -> Self {
        self.point_defense = Some(point_defense);
        self
    }

    /// Whether any ship still has hull left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.ships.iter().any(Ship::is_alive)
    }

    /// Number of living ships.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.ships.iter().filter(|s| s.is_alive()).count()
    }

    /// Number of dead ships.
    #[must_use]
    pub fn losses(&self) -> usize {
        self.ships.len() - self.alive_count()
    }

    /// Victory points of this fleet's destroyed ships.
    #[must_use]
    pub fn destroyed_vp(&self) -> f64 {
        self.ships
            .iter()
            .filter(|s| !s.is_alive())
            .map(|s| s.class.vp())
            .sum()
    }

    pub(crate) fn validate(&self, side: Side, weapons: &WeaponTable) -> Result<(), ConfigError> {
        if self.ships.is_empty() {
            return Err(ConfigError::EmptyFleet {
                side: side.to_string(),
            });
        }
        if let Some(pd) = self.point_defense {
            if !(1..=6).contains(&pd.base) {
                return Err(ConfigError::InvalidPointDefense {
                    side: side.to_string(),
                    base: pd.base,
                });
            }
        }
        self.ships.iter().try_for_each(|ship| ship.validate(weapons))
    }
}
