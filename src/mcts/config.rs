//! Planner configuration parameters.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::ConfigError;

/// How the shared transposition table takes part in the search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranspositionMode {
    /// No table is kept.
    Off,
    /// Aggregates are recorded on every backup but selection ignores them.
    #[default]
    Record,
    /// Selection uses the aggregate mean of all nodes sharing a state.
    Share,
}

/// Progressive-widening MCTS parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Simulations per decision.
    pub simulations: u32,

    /// Widening coefficient: a node may hold `floor(pw_c * visits^pw_alpha)` children.
    pub pw_c: f64,

    /// Widening exponent.
    pub pw_alpha: f64,

    /// Weight of the prior bonus `prior / (1 + visits)`.
    pub prior_scale: f64,

    /// UCB exploration constant (default: 1.414).
    pub exploration: f64,

    /// Maximum actions applied during a rollout.
    pub rollout_depth: u32,

    /// Seed for root determinization.
    pub seed: u64,

    pub transposition: TranspositionMode,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            simulations: 200,
            pw_c: 1.5,
            pw_alpha: 0.6,
            prior_scale: 0.5,
            exploration: 1.414,
            rollout_depth: 2,
            seed: 0,
            transposition: TranspositionMode::Record,
        }
    }
}

impl PlannerConfig {
    pub const ENV_SIMS: &'static str = "ECLIPSE_PW_SIMS";
    pub const ENV_C: &'static str = "ECLIPSE_PW_C";
    pub const ENV_ALPHA: &'static str = "ECLIPSE_PW_ALPHA";
    pub const ENV_DEPTH: &'static str = "ECLIPSE_PW_DEPTH";
    pub const ENV_SEED: &'static str = "ECLIPSE_PW_SEED";

    pub fn with_simulations(mut self, simulations: u32) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_widening(mut self, c: f64, alpha: f64) -> Self {
        self.pw_c = c;
        self.pw_alpha = alpha;
        self
    }

    pub fn with_prior_scale(mut self, scale: f64) -> Self {
        self.prior_scale = scale;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_rollout_depth(mut self, depth: u32) -> Self {
        self.rollout_depth = depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_transposition(mut self, mode: TranspositionMode) -> Self {
        self.transposition = mode;
        self
    }

    /// Defaults overridden by `ECLIPSE_PW_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `ECLIPSE_PW_*` key.
    ///
    /// Values are clamped to sane ranges; unparsable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
            let raw = raw?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(key, value = %raw, "ignoring unparsable planner override");
                    None
                }
            }
        }

        let mut config = Self::default();
        if let Some(sims) = parse::<u32>(Self::ENV_SIMS, lookup(Self::ENV_SIMS)) {
            config.simulations = sims.clamp(1, 1_000_000);
        }
        if let Some(c) = parse::<f64>(Self::ENV_C, lookup(Self::ENV_C)).filter(|v| v.is_finite()) {
            config.pw_c = c.clamp(0.1, 10.0);
        }
        if let Some(alpha) = parse::<f64>(Self::ENV_ALPHA, lookup(Self::ENV_ALPHA)).filter(|v| v.is_finite()) {
            config.pw_alpha = alpha.clamp(0.05, 1.0);
        }
        if let Some(depth) = parse::<u32>(Self::ENV_DEPTH, lookup(Self::ENV_DEPTH)) {
            config.rollout_depth = depth.min(64);
        }
        if let Some(seed) = parse::<u64>(Self::ENV_SEED, lookup(Self::ENV_SEED)) {
            config.seed = seed;
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, value: f64| ConfigError::InvalidPlannerParameter { name, value };

        if self.simulations == 0 {
            return Err(invalid("simulations", 0.0));
        }
        if !(self.pw_c.is_finite() && self.pw_c > 0.0) {
            return Err(invalid("pw_c", self.pw_c));
        }
        if !(self.pw_alpha.is_finite() && self.pw_alpha > 0.0) {
            return Err(invalid("pw_alpha", self.pw_alpha));
        }
        if !(self.prior_scale.is_finite() && self.prior_scale >= 0.0) {
            return Err(invalid("prior_scale", self.prior_scale));
        }
        if !(self.exploration.is_finite() && self.exploration >= 0.0) {
            return Err(invalid("exploration", self.exploration));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.pw_c, 1.5);
        assert_eq!(config.pw_alpha, 0.6);
        assert_eq!(config.prior_scale, 0.5);
        assert_eq!(config.rollout_depth, 2);
        assert_eq!(config.transposition, TranspositionMode::Record);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PlannerConfig::default()
            .with_simulations(50)
            .with_widening(2.0, 0.5)
            .with_seed(123)
            .with_transposition(TranspositionMode::Share);

        assert_eq!(config.simulations, 50);
        assert_eq!(config.pw_c, 2.0);
        assert_eq!(config.seed, 123);
        assert_eq!(config.transposition, TranspositionMode::Share);
    }

    #[test]
    fn test_lookup_overrides_and_clamps() {
        let vars: HashMap<&str, &str> = [
            ("ECLIPSE_PW_SIMS", "0"),
            ("ECLIPSE_PW_C", "2.5"),
            ("ECLIPSE_PW_ALPHA", "7"),
            ("ECLIPSE_PW_DEPTH", "not-a-number"),
            ("ECLIPSE_PW_SEED", " 99 "),
        ]
        .into_iter()
        .collect();
        let config = PlannerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.simulations, 1);
        assert_eq!(config.pw_c, 2.5);
        assert_eq!(config.pw_alpha, 1.0);
        assert_eq!(config.rollout_depth, 2);
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn test_validation() {
        assert!(PlannerConfig::default().with_simulations(0).validate().is_err());
        assert_eq!(
            PlannerConfig::default().with_widening(f64::NAN, 0.6).validate().map_err(|e| e.to_string()),
            Err("invalid planner parameter pw_c = NaN".to_string())
        );
        assert!(PlannerConfig::default().with_prior_scale(-1.0).validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let config = PlannerConfig::default().with_seed(7);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PlannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
