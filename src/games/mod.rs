//! Reference game implementations.
//!
//! - `skirmish`: a compact two-or-more player fleet and economy game that
//!   drives the planner, the combat resolver and the tile-bag beliefs together

pub mod skirmish;
