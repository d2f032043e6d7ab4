//! Monte Carlo battle estimates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::CombatConfig;
use super::resolver::resolve_combat_with;
use super::ship::Side;
use crate::core::{ConfigError, GameRng};

/// Aggregate statistics over repeated battles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatEstimate {
    pub simulations: u32,
    /// Fraction of battles the attacker won outright.
    pub win_probability: f64,
    pub expected_attacker_losses: f64,
    pub expected_defender_losses: f64,
    /// Attacker-perspective VP: reputation value for a win (negative for a loss)
    /// plus destroyed-ship VP delta.
    pub expected_vp_swing: f64,
}

/// Resolve `simulations` battles from one dice stream seeded by `config.seed`.
///
/// A zero budget returns an all-zero estimate.
pub fn estimate_combat(
    config: &CombatConfig,
    simulations: u32,
    reputation_value: f64,
) -> Result<CombatEstimate, ConfigError> {
    config.validate()?;
    if simulations == 0 {
        return Ok(CombatEstimate::default());
    }

    let mut rng = GameRng::new(config.seed);
    let mut wins = 0u32;
    let mut attacker_losses = 0.0;
    let mut defender_losses = 0.0;
    let mut vp_swing = 0.0;

    for _ in 0..simulations {
        let outcome = resolve_combat_with(config, &mut rng)?;
        match outcome.winner {
            Some(Side::Attacker) => {
                wins += 1;
                vp_swing += reputation_value;
            }
            Some(Side::Defender) => vp_swing -= reputation_value,
            None => {}
        }
        vp_swing += outcome.vp_swing();
        attacker_losses += outcome.attacker_losses as f64;
        defender_losses += outcome.defender_losses as f64;
    }

    let n = f64::from(simulations);
    let estimate = CombatEstimate {
        simulations,
        win_probability: f64::from(wins) / n,
        expected_attacker_losses: attacker_losses / n,
        expected_defender_losses: defender_losses / n,
        expected_vp_swing: vp_swing / n,
    };
    debug!(
        simulations,
        win_probability = estimate.win_probability,
        vp_swing = estimate.expected_vp_swing,
        "combat estimate"
    );
    Ok(estimate)
}
