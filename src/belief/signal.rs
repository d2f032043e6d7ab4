//! Hidden opponent archetypes and the observable signal catalog.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ship-design strategy an opponent is assumed to follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Heavy cannons, closes distance.
    Brawler,
    /// Shields and hull, holds territory.
    Turtle,
    /// Front-loaded missile damage.
    MissileAlpha,
    /// Drives and initiative, avoids fights.
    Evasion,
}

impl Archetype {
    pub const COUNT: usize = 4;

    pub const ALL: [Archetype; Self::COUNT] = [
        Archetype::Brawler,
        Archetype::Turtle,
        Archetype::MissileAlpha,
        Archetype::Evasion,
    ];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Archetype::Brawler => "brawler",
            Archetype::Turtle => "turtle",
            Archetype::MissileAlpha => "missile_alpha",
            Archetype::Evasion => "evasion",
        }
    }

    /// Whether this archetype tends to start fights.
    #[must_use]
    pub fn is_aggressive(self) -> bool {
        matches!(self, Archetype::Brawler | Archetype::MissileAlpha)
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An observable opponent action, usually a technology purchase.
///
/// The first seven entries make up the base emission model. The rest are
/// real game signals that carry almost no archetype information and get a
/// near-zero emission probability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Signal {
    Plasma,
    Positron,
    Fusion,
    Gauss,
    Shields,
    Missiles,
    Drive,
    Antimatter,
    Soliton,
    Rift,
    Computer,
    Hull,
    Cloaking,
}

impl Signal {
    pub const COUNT: usize = 13;

    /// Number of signals in the base emission model.
    pub const BASE_COUNT: usize = 7;

    pub const ALL: [Signal; Self::COUNT] = [
        Signal::Plasma,
        Signal::Positron,
        Signal::Fusion,
        Signal::Gauss,
        Signal::Shields,
        Signal::Missiles,
        Signal::Drive,
        Signal::Antimatter,
        Signal::Soliton,
        Signal::Rift,
        Signal::Computer,
        Signal::Hull,
        Signal::Cloaking,
    ];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn is_base(self) -> bool {
        self.index() < Self::BASE_COUNT
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Signal::Plasma => "plasma",
            Signal::Positron => "positron",
            Signal::Fusion => "fusion",
            Signal::Gauss => "gauss",
            Signal::Shields => "shields",
            Signal::Missiles => "missiles",
            Signal::Drive => "drive",
            Signal::Antimatter => "antimatter",
            Signal::Soliton => "soliton",
            Signal::Rift => "rift",
            Signal::Computer => "computer",
            Signal::Hull => "hull",
            Signal::Cloaking => "cloaking",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name is not in the signal catalog.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal '{0}'")]
pub struct UnknownSignal(pub String);

impl FromStr for Signal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Signal::ALL
            .iter()
            .copied()
            .find(|sig| sig.name() == lower)
            .ok_or_else(|| UnknownSignal(s.to_string()))
    }
}
