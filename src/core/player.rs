//! Seats at the table and per-seat storage.
//!
//! Opponent beliefs, threat maps and the reference skirmish state are all
//! keyed by `PlayerId`. Seats are dense, so `PlayerMap` is a plain vector.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// 0-based seat index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(seat: u8) -> Self {
        Self(seat)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Every seat of a table with `count` players.
    pub fn seats(count: usize) -> impl Iterator<Item = PlayerId> {
        (0..count.min(usize::from(u8::MAX)) as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

/// One value per seat.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    seats: Vec<T>,
}

impl<T> PlayerMap<T> {
    pub fn new(player_count: usize, init: impl Fn(PlayerId) -> T) -> Self {
        Self {
            seats: PlayerId::seats(player_count).map(init).collect(),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// `None` for a seat outside the table.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.seats.get(player.index())
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.seats.get_mut(player.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::seats(self.seats.len()).zip(&self.seats)
    }

    /// Every seat except `player`, in seat order.
    pub fn rivals(&self, player: PlayerId) -> impl Iterator<Item = (PlayerId, &T)> {
        self.iter().filter(move |(seat, _)| *seat != player)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.seats[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.seats[player.index()]
    }
}
