//! Six-sided dice and to-hit thresholds.

use crate::core::GameRng;

/// Lowest face that can ever hit; a natural 1 always misses.
pub const MIN_THRESHOLD: u8 = 2;

/// Highest threshold; a natural 6 always hits.
pub const MAX_THRESHOLD: u8 = 6;

/// Source of d6 rolls for the resolver.
pub trait Dice {
    /// Roll one die, returning a face in 1..=6.
    fn roll(&mut self) -> u8;
}

impl Dice for GameRng {
    fn roll(&mut self) -> u8 {
        self.roll_d6()
    }
}

/// Replays a fixed sequence of faces, cycling when it runs out.
///
/// A script that never hits keeps armed fleets fighting until
/// [`UNCAPPED_ROUND_LIMIT`](crate::combat::UNCAPPED_ROUND_LIMIT); set a
/// round cap on such fixtures.
///
/// Used for fixtures where a specific roll must come up.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    faces: Vec<u8>,
    next: usize,
}

impl ScriptedDice {
    /// Faces outside 1..=6 are clamped into range. An empty script rolls 1s.
    #[must_use]
    pub fn new(faces: impl Into<Vec<u8>>) -> Self {
        let faces = faces.into().into_iter().map(|f| f.clamp(1, 6)).collect();
        Self { faces, next: 0 }
    }

    /// Number of faces consumed so far.
    #[must_use]
    pub fn rolls(&self) -> usize {
        self.next
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let face = if self.faces.is_empty() {
            1
        } else {
            self.faces[self.next % self.faces.len()]
        };
        self.next += 1;
        face
    }
}

/// Face needed to hit: base reduced by computers, raised by shields, clamped to 2..=6.
#[must_use]
pub fn to_hit_threshold(base: u8, computer: u8, shield: u8) -> u8 {
    let raw = i32::from(base) - i32::from(computer) + i32::from(shield);
    raw.clamp(i32::from(MIN_THRESHOLD), i32::from(MAX_THRESHOLD)) as u8
}
