//! Discrete hidden Markov model over opponent archetypes.
//!
//! The observation alphabet is the fixed [`Signal`] catalog, so every
//! signal an opponent can produce already has an emission column. Signals
//! outside the base model carry a near-zero probability instead of being
//! rejected.

use serde::{Deserialize, Serialize};

use super::signal::{Archetype, Signal};
use crate::core::ConfigError;

/// Floor applied to every filtered probability.
pub const MIN_PROBABILITY: f64 = 1e-12;

/// Emission probability assigned to signals outside the base model.
pub const UNSEEN_EMISSION: f64 = 1e-6;

const A: usize = Archetype::COUNT;
const S: usize = Signal::COUNT;

/// A probability distribution over [`Archetype`]s. Always sums to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDistribution {
    probs: [f64; A],
}

impl ArchetypeDistribution {
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            probs: [1.0 / A as f64; A],
        }
    }

    /// Normalize non-negative weights. Degenerate input yields the uniform distribution.
    #[must_use]
    pub fn from_weights(weights: [f64; A]) -> Self {
        Self {
            probs: normalized(weights),
        }
    }

    #[must_use]
    pub fn get(&self, archetype: Archetype) -> f64 {
        self.probs[archetype.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Archetype, f64)> + '_ {
        Archetype::ALL.iter().map(move |a| (*a, self.probs[a.index()]))
    }

    #[must_use]
    pub fn as_array(&self) -> [f64; A] {
        self.probs
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Archetype with the highest probability; ties go to the earlier archetype.
    #[must_use]
    pub fn most_likely(&self) -> Archetype {
        let mut best = Archetype::ALL[0];
        for archetype in Archetype::ALL {
            if self.get(archetype) > self.get(best) {
                best = archetype;
            }
        }
        best
    }

    /// Probability mass on archetypes that tend to start fights.
    #[must_use]
    pub fn aggression(&self) -> f64 {
        self.iter()
            .filter(|(a, _)| a.is_aggressive())
            .map(|(_, p)| p)
            .sum()
    }
}

impl Default for ArchetypeDistribution {
    fn default() -> Self {
        Self::uniform()
    }
}

fn normalized<const N: usize>(mut row: [f64; N]) -> [f64; N] {
    let total: f64 = row.iter().filter(|p| p.is_finite() && **p > 0.0).sum();
    if !(total > 0.0 && total.is_finite()) {
        return [1.0 / N as f64; N];
    }
    for p in &mut row {
        *p = if p.is_finite() && *p > 0.0 { *p / total } else { 0.0 };
    }
    row
}

/// Start, transition and emission tables of the archetype HMM.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeModel {
    start: [f64; A],
    transition: [[f64; A]; A],
    emission: [[f64; S]; A],
}

impl ArchetypeModel {
    /// Build a model, renormalizing every row.
    #[must_use]
    pub fn new(start: [f64; A], transition: [[f64; A]; A], emission: [[f64; S]; A]) -> Self {
        Self {
            start: normalized(start),
            transition: transition.map(normalized),
            emission: emission.map(normalized),
        }
    }

    /// Uniform start, sticky transitions (0.7 stay) and archetype-flavored emissions.
    #[must_use]
    pub fn standard() -> Self {
        let start = [1.0; A];
        let stay = 0.7;
        let mut transition = [[(1.0 - stay) / (A as f64 - 1.0); A]; A];
        for (i, row) in transition.iter_mut().enumerate() {
            row[i] = stay;
        }

        let base = 1.0 / Signal::BASE_COUNT as f64;
        let mut emission = [[0.0; S]; A];
        for archetype in Archetype::ALL {
            let mut row = [0.0; S];
            for signal in Signal::ALL.iter().filter(|s| s.is_base()) {
                row[signal.index()] = match (archetype, signal) {
                    (Archetype::Brawler, Signal::Plasma | Signal::Positron) => 0.25,
                    (Archetype::Turtle, Signal::Shields | Signal::Gauss) => 0.25,
                    (Archetype::MissileAlpha, Signal::Missiles) => 0.35,
                    (Archetype::Evasion, Signal::Drive) => 0.25,
                    _ => base,
                };
            }
            let mut row = normalized(row);
            for signal in Signal::ALL.iter().filter(|s| !s.is_base()) {
                row[signal.index()] = UNSEEN_EMISSION;
            }
            emission[archetype.index()] = row;
        }

        Self::new(start, transition, emission)
    }

    #[must_use]
    pub fn start(&self) -> ArchetypeDistribution {
        ArchetypeDistribution { probs: self.start }
    }

    #[must_use]
    pub fn transition(&self, from: Archetype, to: Archetype) -> f64 {
        self.transition[from.index()][to.index()]
    }

    #[must_use]
    pub fn emission(&self, archetype: Archetype, signal: Signal) -> f64 {
        self.emission[archetype.index()][signal.index()]
    }

    /// Filtered distribution after each observation (forward algorithm).
    #[must_use]
    pub fn forward(&self, observations: &[Signal]) -> Vec<ArchetypeDistribution> {
        let mut out = Vec::with_capacity(observations.len());
        self.run_filter(observations, 1.0, |d| out.push(d));
        out
    }

    /// Posterior given the full history. Uniform when nothing was observed.
    #[must_use]
    pub fn posterior(&self, observations: &[Signal]) -> ArchetypeDistribution {
        let mut last = ArchetypeDistribution::uniform();
        self.run_filter(observations, 1.0, |d| last = d);
        last
    }

    /// Posterior where each step first blends the previous belief with the start
    /// distribution: `rho * previous + (1 - rho) * start`.
    ///
    /// `rho = 1` is standard filtering; `rho = 0` keeps only the latest observation.
    pub fn posterior_with_forgetting(
        &self,
        observations: &[Signal],
        rho: f64,
    ) -> Result<ArchetypeDistribution, ConfigError> {
        if !(0.0..=1.0).contains(&rho) {
            return Err(ConfigError::InvalidForgetting { rho });
        }
        let mut last = ArchetypeDistribution::uniform();
        self.run_filter(observations, rho, |d| last = d);
        Ok(last)
    }

    fn run_filter(&self, observations: &[Signal], rho: f64, mut emit: impl FnMut(ArchetypeDistribution)) {
        let Some((first, rest)) = observations.split_first() else {
            return;
        };

        let mut alpha = [0.0; A];
        for (s, a) in alpha.iter_mut().enumerate() {
            *a = (self.start[s] * self.emission[s][first.index()]).max(MIN_PROBABILITY);
        }
        alpha = normalized(alpha);
        emit(ArchetypeDistribution { probs: alpha });

        for signal in rest {
            let mut prior = [0.0; A];
            for (sp, p) in prior.iter_mut().enumerate() {
                *p = rho * alpha[sp] + (1.0 - rho) * self.start[sp];
            }
            let mut next = [0.0; A];
            for (s, n) in next.iter_mut().enumerate() {
                let carried: f64 = (0..A).map(|sp| prior[sp] * self.transition[sp][s]).sum();
                *n = (carried * self.emission[s][signal.index()]).max(MIN_PROBABILITY);
            }
            alpha = normalized(next);
            emit(ArchetypeDistribution { probs: alpha });
        }
    }

    /// Most likely archetype sequence (Viterbi, log space).
    #[must_use]
    pub fn viterbi(&self, observations: &[Signal]) -> Vec<Archetype> {
        let Some((first, rest)) = observations.split_first() else {
            return Vec::new();
        };
        let ln = |p: f64| p.max(MIN_PROBABILITY).ln();

        let mut score = [0.0; A];
        for (s, v) in score.iter_mut().enumerate() {
            *v = ln(self.start[s]) + ln(self.emission[s][first.index()]);
        }
        let mut back: Vec<[usize; A]> = Vec::with_capacity(rest.len());

        for signal in rest {
            let mut next = [0.0; A];
            let mut from = [0usize; A];
            for s in 0..A {
                let (best_sp, best) = (0..A)
                    .map(|sp| (sp, score[sp] + ln(self.transition[sp][s])))
                    .fold((0, f64::NEG_INFINITY), |acc, x| if x.1 > acc.1 { x } else { acc });
                next[s] = best + ln(self.emission[s][signal.index()]);
                from[s] = best_sp;
            }
            score = next;
            back.push(from);
        }

        let mut state = (0..A)
            .fold(0, |best, s| if score[s] > score[best] { s } else { best });
        let mut path = vec![Archetype::ALL[state]];
        for from in back.iter().rev() {
            state = from[state];
            path.push(Archetype::ALL[state]);
        }
        path.reverse();
        path
    }
}

impl Default for ArchetypeModel {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normalized(d: &ArchetypeDistribution) {
        assert!((d.total() - 1.0).abs() < 1e-9, "total was {}", d.total());
    }

    #[test]
    fn test_standard_rows_sum_to_one() {
        let model = ArchetypeModel::standard();
        for from in Archetype::ALL {
            let t: f64 = Archetype::ALL.iter().map(|to| model.transition(from, *to)).sum();
            let e: f64 = Signal::ALL.iter().map(|s| model.emission(from, *s)).sum();
            assert!((t - 1.0).abs() < 1e-12);
            assert!((e - 1.0).abs() < 1e-12);
        }
        assert!(model.emission(Archetype::Brawler, Signal::Cloaking) < 1e-5);
    }

    #[test]
    fn test_empty_history_is_uniform() {
        let model = ArchetypeModel::standard();
        assert_eq!(model.posterior(&[]), ArchetypeDistribution::uniform());
        assert!(model.forward(&[]).is_empty());
        assert!(model.viterbi(&[]).is_empty());
    }

    #[test]
    fn test_missile_signals_favor_missile_alpha() {
        let model = ArchetypeModel::standard();
        let obs = [Signal::Missiles; 4];
        let posterior = model.posterior(&obs);
        assert_normalized(&posterior);
        assert_eq!(posterior.most_likely(), Archetype::MissileAlpha);
        assert_eq!(model.viterbi(&obs), vec![Archetype::MissileAlpha; 4]);
    }

    #[test]
    fn test_unseen_signal_keeps_distribution_valid() {
        let model = ArchetypeModel::standard();
        let posterior = model.posterior(&[Signal::Shields, Signal::Cloaking, Signal::Rift]);
        assert_normalized(&posterior);
        assert!(posterior.iter().all(|(_, p)| p.is_finite() && p > 0.0));
    }

    #[test]
    fn test_forgetting_extremes() {
        let model = ArchetypeModel::standard();
        let obs = [Signal::Plasma, Signal::Shields, Signal::Gauss];

        let standard = model.posterior(&obs);
        let rho_one = model.posterior_with_forgetting(&obs, 1.0).unwrap();
        for (a, p) in standard.iter() {
            assert!((p - rho_one.get(a)).abs() < 1e-12);
        }

        let a = model
            .posterior_with_forgetting(&[Signal::Plasma, Signal::Missiles], 0.0)
            .unwrap();
        let b = model
            .posterior_with_forgetting(&[Signal::Shields, Signal::Missiles], 0.0)
            .unwrap();
        for (arch, p) in a.iter() {
            assert!((p - b.get(arch)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_forgetting_rejects_bad_rho() {
        let model = ArchetypeModel::standard();
        assert_eq!(
            model.posterior_with_forgetting(&[Signal::Drive], 1.5),
            Err(ConfigError::InvalidForgetting { rho: 1.5 })
        );
        assert!(model.posterior_with_forgetting(&[Signal::Drive], f64::NAN).is_err());
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_uniform() {
        let d = ArchetypeDistribution::from_weights([0.0, -1.0, f64::NAN, 0.0]);
        assert_eq!(d, ArchetypeDistribution::uniform());
    }
}
