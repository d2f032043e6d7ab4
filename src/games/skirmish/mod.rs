//! Skirmish: a compact fleet-and-economy game for exercising the planner.
//!
//! Each player holds materials, science, a handful of action discs and a
//! fleet. Actions:
//! - Research and Upgrade fit better computers and shields to every ship
//! - Build commissions an interceptor, cruiser or dreadnought
//! - Explore settles the tile category the bag most likely holds
//! - MoveFight attacks another player through the combat resolver
//! - Pass ends the turn and leaves the state untouched

mod game;
mod state;

pub use game::{build_cost, Skirmish, SkirmishAction, TileYield, MAX_FLEET, MAX_SHIELDS, MAX_TECH, RESEARCH_COST, UPGRADE_COST};
pub use state::{Empire, SkirmishState};
