//! Belief tracker configuration.

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Configuration for particle filters and opponent filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefConfig {
    /// Particles per bag.
    pub particles: usize,

    /// Resample when ESS falls below this fraction of the particle count.
    pub resample_threshold: f64,

    /// Default forgetting weight for opponent posteriors (1.0 = no forgetting).
    pub forgetting: f64,

    /// Seed for resampling and hidden-removal sampling.
    pub seed: u64,

    /// Floor for particle weights and likelihoods.
    pub min_weight: f64,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            particles: 512,
            resample_threshold: 0.5,
            forgetting: 1.0,
            seed: 0,
            min_weight: 1e-20,
        }
    }
}

impl BeliefConfig {
    #[must_use]
    pub fn with_particles(mut self, particles: usize) -> Self {
        self.particles = particles;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_forgetting(mut self, rho: f64) -> Self {
        self.forgetting = rho;
        self
    }

    #[must_use]
    pub fn with_resample_threshold(mut self, threshold: f64) -> Self {
        self.resample_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particles == 0 {
            return Err(ConfigError::NoParticles);
        }
        if !(0.0..=1.0).contains(&self.forgetting) {
            return Err(ConfigError::InvalidForgetting {
                rho: self.forgetting,
            });
        }
        if !(0.0..=1.0).contains(&self.resample_threshold) {
            return Err(ConfigError::InvalidBeliefParameter {
                name: "resample_threshold",
                value: self.resample_threshold,
            });
        }
        if !(self.min_weight > 0.0 && self.min_weight < 1.0) {
            return Err(ConfigError::InvalidBeliefParameter {
                name: "min_weight",
                value: self.min_weight,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BeliefConfig::default();
        assert_eq!(config.particles, 512);
        assert_eq!(config.resample_threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            BeliefConfig::default().with_particles(0).validate(),
            Err(ConfigError::NoParticles)
        );
        assert_eq!(
            BeliefConfig::default().with_forgetting(-0.1).validate(),
            Err(ConfigError::InvalidForgetting { rho: -0.1 })
        );
        assert!(BeliefConfig::default()
            .with_resample_threshold(2.0)
            .validate()
            .is_err());
    }
}
