//! Weapon kinds, per-weapon profiles and the profile table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Weapon families a ship part can mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Ion,
    Plasma,
    Soliton,
    Antimatter,
    Rift,
    Missile,
}

impl WeaponKind {
    /// Every kind, in table order.
    pub const ALL: [WeaponKind; 6] = [
        WeaponKind::Ion,
        WeaponKind::Plasma,
        WeaponKind::Soliton,
        WeaponKind::Antimatter,
        WeaponKind::Rift,
        WeaponKind::Missile,
    ];

    /// Lowercase name used in diagnostics and errors.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Ion => "ion",
            WeaponKind::Plasma => "plasma",
            WeaponKind::Soliton => "soliton",
            WeaponKind::Antimatter => "antimatter",
            WeaponKind::Rift => "rift",
            WeaponKind::Missile => "missile",
        }
    }
}

impl std::fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable to-hit and damage numbers for one weapon kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Die face needed to hit before computers and shields.
    pub base_to_hit: u8,
    /// Hull points removed per hit.
    pub damage: u8,
    /// Rift weapons only fire when the rift-cannon rule is enabled.
    pub is_rift: bool,
}

impl WeaponProfile {
    /// Create a regular (non-rift) profile.
    #[must_use]
    pub const fn new(base_to_hit: u8, damage: u8) -> Self {
        Self {
            base_to_hit,
            damage,
            is_rift: false,
        }
    }

    /// Create a rift profile.
    #[must_use]
    pub const fn rift(base_to_hit: u8, damage: u8) -> Self {
        Self {
            base_to_hit,
            damage,
            is_rift: true,
        }
    }

    fn validate(&self, kind: WeaponKind) -> Result<(), ConfigError> {
        if !(1..=6).contains(&self.base_to_hit) {
            return Err(ConfigError::InvalidTarget {
                weapon: kind.name().to_string(),
                base_to_hit: self.base_to_hit,
            });
        }
        if self.damage == 0 {
            return Err(ConfigError::ZeroDamage {
                weapon: kind.name().to_string(),
            });
        }
        Ok(())
    }
}

/// Lookup table from weapon kind to profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponTable {
    profiles: BTreeMap<WeaponKind, WeaponProfile>,
}

impl WeaponTable {
    /// An empty table. Every mounted weapon must be added before resolving.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Second-edition base numbers: everything hits on a 6, damage by family.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(WeaponKind::Ion, WeaponProfile::new(6, 1))
            .with(WeaponKind::Plasma, WeaponProfile::new(6, 2))
            .with(WeaponKind::Soliton, WeaponProfile::new(6, 3))
            .with(WeaponKind::Antimatter, WeaponProfile::new(6, 4))
            .with(WeaponKind::Rift, WeaponProfile::rift(5, 2))
            .with(WeaponKind::Missile, WeaponProfile::new(6, 2))
    }

    /// Builder: set the profile for a kind.
    #[must_use]
    pub fn with(mut self, kind: WeaponKind, profile: WeaponProfile) -> Self {
        self.profiles.insert(kind, profile);
        self
    }

    /// Set the profile for a kind in place.
    pub fn insert(&mut self, kind: WeaponKind, profile: WeaponProfile) {
        self.profiles.insert(kind, profile);
    }

    /// Profile for a kind, if declared.
    #[must_use]
    pub fn get(&self, kind: WeaponKind) -> Option<&WeaponProfile> {
        self.profiles.get(&kind)
    }

    /// Iterate over declared profiles.
    pub fn iter(&self) -> impl Iterator<Item = (WeaponKind, &WeaponProfile)> {
        self.profiles.iter().map(|(k, p)| (*k, p))
    }

    /// Check every declared profile is well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.profiles
            .iter()
            .try_for_each(|(kind, profile)| profile.validate(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_valid() {
        let table = WeaponTable::standard();
        assert!(table.validate().is_ok());
        assert_eq!(table.get(WeaponKind::Plasma), Some(&WeaponProfile::new(6, 2)));
        assert!(table.get(WeaponKind::Rift).map_or(false, |p| p.is_rift));
    }

    #[test]
    fn test_malformed_profiles_rejected() {
        let bad_target = WeaponTable::new().with(WeaponKind::Ion, WeaponProfile::new(7, 1));
        assert_eq!(
            bad_target.validate(),
            Err(ConfigError::InvalidTarget {
                weapon: "ion".into(),
                base_to_hit: 7
            })
        );

        let no_damage = WeaponTable::new().with(WeaponKind::Plasma, WeaponProfile::new(5, 0));
        assert_eq!(
            no_damage.validate(),
            Err(ConfigError::ZeroDamage {
                weapon: "plasma".into()
            })
        );
    }

    #[test]
    fn test_table_serialization() {
        let table = WeaponTable::standard();
        let json = serde_json::to_string(&table).unwrap();
        let back: WeaponTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, back);
    }
}
