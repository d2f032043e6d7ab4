//! Particle filter over the remaining contents of a tile bag.
//!
//! Each particle is one hypothesis of how many tiles of each category are
//! still in the bag, plus pins recording which category a revealed slot
//! turned out to be. Weights are renormalized after every update and the
//! set is resampled systematically when its effective sample size drops.

use std::collections::BTreeMap;

use im::HashMap as ImHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::config::BeliefConfig;
use super::math::ln_hypergeometric;
use crate::core::{ConfigError, GameRng, GameRngState};

/// Declared bag contents: category name to tile count.
pub type BagComposition = BTreeMap<String, u32>;

/// One weighted hypothesis of the bag's remaining contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    counts: SmallVec<[u32; 8]>,
    pins: ImHashMap<String, SlotPin>,
    weight: f64,
}

/// Category a revealed slot was pinned to, and whether pinning it took a
/// tile out of the counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SlotPin {
    category: usize,
    took: bool,
}

impl Particle {
    /// Remaining count per category, in the set's category order.
    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Category index pinned to a revealed slot.
    #[must_use]
    pub fn pin(&self, slot: &str) -> Option<usize> {
        self.pins.get(slot).map(|pin| pin.category)
    }

    /// Removes one tile of `category`; false when none was left.
    fn take(&mut self, category: usize) -> bool {
        match self.counts.get_mut(category) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    fn give_back(&mut self, category: usize) {
        if let Some(count) = self.counts.get_mut(category) {
            *count += 1;
        }
    }

    fn pin_slot(&mut self, slot: &str, category: usize) {
        let took = self.take(category);
        self.pins.insert(slot.to_string(), SlotPin { category, took });
    }
}

/// Weighted ensemble of bag hypotheses.
#[derive(Clone, Debug)]
pub struct ParticleSet {
    bag: String,
    categories: Vec<String>,
    particles: Vec<Particle>,
    resample_threshold: f64,
    min_weight: f64,
    rng: GameRng,
    resamples: u32,
}

impl ParticleSet {
    /// Every particle starts from the declared composition with uniform weight.
    pub fn new(
        bag: impl Into<String>,
        composition: &BagComposition,
        config: &BeliefConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_hidden_removals(bag, composition, 0, config)
    }

    /// Like [`ParticleSet::new`], but each particle also assumes `removed`
    /// tiles already left the bag unseen, sampled in proportion to the counts.
    pub fn with_hidden_removals(
        bag: impl Into<String>,
        composition: &BagComposition,
        removed: u32,
        config: &BeliefConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if composition.is_empty() {
            return Err(ConfigError::EmptyBag);
        }

        let categories: Vec<String> = composition.keys().cloned().collect();
        let initial: SmallVec<[u32; 8]> = composition.values().copied().collect();
        let mut rng = GameRng::new(config.seed);
        let uniform = 1.0 / config.particles as f64;

        let particles = (0..config.particles)
            .map(|_| {
                let mut counts = initial.clone();
                for _ in 0..removed {
                    let weights: SmallVec<[f64; 8]> = counts.iter().map(|c| f64::from(*c)).collect();
                    match rng.choose_weighted(&weights) {
                        Some(i) => counts[i] -= 1,
                        None => break,
                    }
                }
                Particle {
                    counts,
                    pins: ImHashMap::new(),
                    weight: uniform,
                }
            })
            .collect();

        Ok(Self {
            bag: bag.into(),
            categories,
            particles,
            resample_threshold: config.resample_threshold,
            min_weight: config.min_weight,
            rng,
            resamples: 0,
        })
    }

    #[must_use]
    pub fn bag(&self) -> &str {
        &self.bag
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Number of resampling passes so far.
    #[must_use]
    pub fn resamples(&self) -> u32 {
        self.resamples
    }

    /// Effective sample size, `1 / sum(w^2)`.
    #[must_use]
    pub fn ess(&self) -> f64 {
        let sum_sq: f64 = self.particles.iter().map(|p| p.weight * p.weight).sum();
        if sum_sq > 0.0 {
            1.0 / sum_sq
        } else {
            0.0
        }
    }

    fn category_index(&self, category: &str) -> Result<usize, ConfigError> {
        self.categories
            .iter()
            .position(|c| c == category)
            .ok_or_else(|| ConfigError::UnknownCategory {
                bag: self.bag.clone(),
                category: category.to_string(),
            })
    }

    fn ensure_not_exhausted(&self) -> Result<(), ConfigError> {
        if self.particles.iter().all(|p| p.total() == 0) {
            return Err(ConfigError::BagExhausted {
                bag: self.bag.clone(),
            });
        }
        Ok(())
    }

    /// A tile of `category` was drawn and kept.
    ///
    /// Each particle is weighted by `count / total` and then loses one tile of
    /// that category (if it has any).
    pub fn update_on_draw(&mut self, category: &str) -> Result<(), ConfigError> {
        let idx = self.category_index(category)?;
        self.ensure_not_exhausted()?;

        let floor = self.min_weight;
        for p in &mut self.particles {
            let total = p.total();
            let likelihood = if total == 0 {
                floor
            } else {
                (f64::from(p.counts[idx]) / f64::from(total)).max(floor)
            };
            p.weight *= likelihood;
            p.take(idx);
        }
        self.settle();
        Ok(())
    }

    /// Tiles were looked at and returned. Weights follow the multivariate
    /// hypergeometric likelihood; counts are untouched.
    pub fn update_on_peek(&mut self, seen: &[(&str, u32)]) -> Result<(), ConfigError> {
        let mut observed: SmallVec<[u32; 8]> = SmallVec::from_elem(0, self.categories.len());
        for (category, count) in seen {
            observed[self.category_index(category)?] += count;
        }
        if observed.iter().all(|c| *c == 0) {
            return Ok(());
        }
        self.ensure_not_exhausted()?;

        let floor = self.min_weight;
        for p in &mut self.particles {
            let log_like = ln_hypergeometric(&p.counts, &observed);
            let likelihood = if log_like.is_finite() {
                log_like.exp().max(floor)
            } else {
                floor
            };
            p.weight *= likelihood;
        }
        self.settle();
        Ok(())
    }

    /// A hidden slot was revealed as `category`.
    ///
    /// A newly pinned slot removes one tile of the category. Particles that
    /// pinned the slot to a different category drop to the weight floor and
    /// are re-pinned: the tile taken for the old category goes back and one
    /// of the new category is taken.
    pub fn update_on_reveal(&mut self, slot: &str, category: &str) -> Result<(), ConfigError> {
        let idx = self.category_index(category)?;

        let floor = self.min_weight;
        for p in &mut self.particles {
            match p.pins.get(slot).copied() {
                Some(pin) if pin.category == idx => {}
                Some(pin) => {
                    p.weight *= floor;
                    if pin.took {
                        p.give_back(pin.category);
                    }
                    p.pin_slot(slot, idx);
                }
                None => p.pin_slot(slot, idx),
            }
        }
        self.settle();
        Ok(())
    }

    /// Weight-averaged expected count per category.
    #[must_use]
    pub fn marginal_bag(&self) -> BTreeMap<String, f64> {
        let mut expected = vec![0.0; self.categories.len()];
        let mut total_weight = 0.0;
        for p in &self.particles {
            total_weight += p.weight;
            for (e, c) in expected.iter_mut().zip(&p.counts) {
                *e += p.weight * f64::from(*c);
            }
        }
        let scale = if total_weight > 0.0 { 1.0 / total_weight } else { 0.0 };
        self.categories
            .iter()
            .cloned()
            .zip(expected.into_iter().map(|e| e * scale))
            .collect()
    }

    /// Expected remaining count of one category.
    #[must_use]
    pub fn expected_count(&self, category: &str) -> Option<f64> {
        let idx = self.categories.iter().position(|c| c == category)?;
        let weighted: f64 = self
            .particles
            .iter()
            .map(|p| p.weight * f64::from(p.counts[idx]))
            .sum();
        let total: f64 = self.particles.iter().map(|p| p.weight).sum();
        Some(if total > 0.0 { weighted / total } else { 0.0 })
    }

    fn settle(&mut self) {
        self.normalize();
        let ess = self.ess();
        let n = self.particles.len() as f64;
        if ess < self.resample_threshold * n {
            self.resample();
            debug!(bag = %self.bag, ess, particles = self.particles.len(), "resampled particles");
        }
    }

    fn normalize(&mut self) {
        let n = self.particles.len() as f64;
        let total: f64 = self.particles.iter().map(|p| p.weight).sum();
        if !(total > 0.0 && total.is_finite()) {
            for p in &mut self.particles {
                p.weight = 1.0 / n;
            }
            return;
        }
        let floor = self.min_weight;
        for p in &mut self.particles {
            p.weight = (p.weight / total).max(floor);
        }
        let floored: f64 = self.particles.iter().map(|p| p.weight).sum();
        for p in &mut self.particles {
            p.weight /= floored;
        }
    }

    /// Systematic resampling: one uniform offset, N evenly spaced pointers.
    fn resample(&mut self) {
        let n = self.particles.len();
        if n == 0 {
            return;
        }
        let step = 1.0 / n as f64;
        let offset = self.rng.gen_unit() * step;

        let mut next = Vec::with_capacity(n);
        let mut cumulative = self.particles[0].weight;
        let mut i = 0;
        for j in 0..n {
            let pointer = offset + j as f64 * step;
            while pointer > cumulative && i + 1 < n {
                i += 1;
                cumulative += self.particles[i].weight;
            }
            let mut p = self.particles[i].clone();
            p.weight = step;
            next.push(p);
        }
        self.particles = next;
        self.resamples += 1;
    }

    pub(crate) fn to_state(&self) -> ParticleSetState {
        ParticleSetState {
            bag: self.bag.clone(),
            categories: self.categories.clone(),
            particles: self.particles.clone(),
            resample_threshold: self.resample_threshold,
            min_weight: self.min_weight,
            rng: self.rng.state(),
            resamples: self.resamples,
        }
    }

    pub(crate) fn from_state(state: ParticleSetState) -> Result<Self, ConfigError> {
        if state.categories.is_empty() {
            return Err(ConfigError::EmptyBag);
        }
        if state.particles.is_empty() {
            return Err(ConfigError::NoParticles);
        }
        if let Some(bad) = state
            .particles
            .iter()
            .find(|p| p.counts.len() != state.categories.len())
        {
            return Err(ConfigError::UnknownCategory {
                bag: state.bag.clone(),
                category: format!("#{}", bad.counts.len()),
            });
        }
        Ok(Self {
            bag: state.bag,
            categories: state.categories,
            particles: state.particles,
            resample_threshold: state.resample_threshold,
            min_weight: state.min_weight,
            rng: GameRng::from_state(&state.rng),
            resamples: state.resamples,
        })
    }
}

/// Lossless serialized form of a [`ParticleSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ParticleSetState {
    bag: String,
    categories: Vec<String>,
    particles: Vec<Particle>,
    resample_threshold: f64,
    min_weight: f64,
    rng: GameRngState,
    resamples: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition(items: &[(&str, u32)]) -> BagComposition {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn weight_sum(set: &ParticleSet) -> f64 {
        set.particles().iter().map(Particle::weight).sum()
    }

    #[test]
    fn test_new_set_is_uniform() {
        let config = BeliefConfig::default().with_particles(64);
        let set = ParticleSet::new("I", &composition(&[("money", 3), ("science", 2)]), &config).unwrap();
        assert_eq!(set.particle_count(), 64);
        assert!((weight_sum(&set) - 1.0).abs() < 1e-12);
        assert!((set.ess() - 64.0).abs() < 1e-9);
        assert_eq!(set.marginal_bag()["money"], 3.0);
    }

    #[test]
    fn test_empty_composition_rejected() {
        let err = ParticleSet::new("I", &BagComposition::new(), &BeliefConfig::default()).unwrap_err();
        assert_eq!(err, ConfigError::EmptyBag);
    }

    #[test]
    fn test_draw_decrements_and_renormalizes() {
        let config = BeliefConfig::default().with_particles(16);
        let mut set = ParticleSet::new("I", &composition(&[("a", 2), ("b", 1)]), &config).unwrap();
        set.update_on_draw("a").unwrap();

        assert!((weight_sum(&set) - 1.0).abs() < 1e-12);
        assert!((set.expected_count("a").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(set.expected_count("b"), Some(1.0));
    }

    #[test]
    fn test_draw_errors() {
        let config = BeliefConfig::default().with_particles(4);
        let mut set = ParticleSet::new("I", &composition(&[("a", 1)]), &config).unwrap();
        assert!(matches!(
            set.update_on_draw("z"),
            Err(ConfigError::UnknownCategory { .. })
        ));
        set.update_on_draw("a").unwrap();
        assert_eq!(
            set.update_on_draw("a"),
            Err(ConfigError::BagExhausted { bag: "I".into() })
        );
    }

    #[test]
    fn test_counts_never_negative_when_category_missing() {
        let config = BeliefConfig::default().with_particles(8);
        let mut set = ParticleSet::new("I", &composition(&[("a", 0), ("b", 2)]), &config).unwrap();
        set.update_on_draw("a").unwrap();
        assert!(set.particles().iter().all(|p| p.counts()[0] == 0));
        assert!((weight_sum(&set) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_peek_prefers_consistent_hypotheses() {
        let config = BeliefConfig::default().with_particles(400).with_seed(3);
        let mut set =
            ParticleSet::with_hidden_removals("II", &composition(&[("a", 3), ("b", 3)]), 3, &config).unwrap();
        let before = set.expected_count("a").unwrap();
        set.update_on_peek(&[("a", 3)]).unwrap();

        // Only hypotheses that still hold three 'a' tiles can explain the peek.
        let after = set.expected_count("a").unwrap();
        assert!(after > before);
        assert!((after - 3.0).abs() < 1e-6);
        assert!((weight_sum(&set) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_peek_is_noop() {
        let config = BeliefConfig::default().with_particles(4);
        let mut set = ParticleSet::new("I", &composition(&[("a", 1)]), &config).unwrap();
        let before = set.particles().to_vec();
        set.update_on_peek(&[("a", 0)]).unwrap();
        assert_eq!(set.particles(), before.as_slice());
    }

    #[test]
    fn test_conflicting_reveal_is_down_weighted() {
        let config = BeliefConfig::default().with_particles(8);
        let mut set = ParticleSet::new("I", &composition(&[("a", 2), ("b", 2)]), &config).unwrap();
        set.update_on_reveal("hex-1", "a").unwrap();
        assert!(set.particles().iter().all(|p| p.pin("hex-1") == Some(0)));
        assert_eq!(set.expected_count("a"), Some(1.0));

        // Repeating a consistent reveal does not remove another tile.
        set.update_on_reveal("hex-1", "a").unwrap();
        assert_eq!(set.expected_count("a"), Some(1.0));

        set.update_on_reveal("hex-1", "b").unwrap();
        assert!((weight_sum(&set) - 1.0).abs() < 1e-9);
        assert!(set.particles().iter().all(|p| p.pin("hex-1") == Some(1)));
    }

    #[test]
    fn test_corrected_reveal_moves_the_tile() {
        let config = BeliefConfig::default().with_particles(4);
        let mut set = ParticleSet::new("I", &composition(&[("a", 1), ("b", 1)]), &config).unwrap();

        set.update_on_reveal("s", "a").unwrap();
        assert_eq!(set.expected_count("a"), Some(0.0));
        assert_eq!(set.expected_count("b"), Some(1.0));

        set.update_on_reveal("s", "b").unwrap();
        assert_eq!(set.expected_count("a"), Some(1.0));
        assert_eq!(set.expected_count("b"), Some(0.0));
        assert!((weight_sum(&set) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_corrected_reveal_never_exceeds_composition() {
        let config = BeliefConfig::default().with_particles(4);
        let mut set = ParticleSet::new("I", &composition(&[("a", 0), ("b", 2)]), &config).unwrap();

        // nothing to take for "a", so nothing goes back when corrected
        set.update_on_reveal("s", "a").unwrap();
        set.update_on_reveal("s", "b").unwrap();
        assert!(set.particles().iter().all(|p| p.counts() == [0, 1]));
    }

    #[test]
    fn test_degenerate_weights_trigger_resample() {
        let config = BeliefConfig::default().with_particles(100).with_seed(11);
        let mut set =
            ParticleSet::with_hidden_removals("III", &composition(&[("a", 2), ("b", 2)]), 2, &config).unwrap();
        set.update_on_peek(&[("a", 2)]).unwrap();

        assert!(set.resamples() >= 1);
        let n = set.particle_count() as f64;
        assert!(set.particles().iter().all(|p| (p.weight() - 1.0 / n).abs() < 1e-12));
        assert!(set.particles().iter().all(|p| p.counts()[0] == 2));
    }

    #[test]
    fn test_state_round_trip() {
        let config = BeliefConfig::default().with_particles(10).with_seed(5);
        let mut set =
            ParticleSet::with_hidden_removals("I", &composition(&[("a", 4), ("b", 1)]), 1, &config).unwrap();
        set.update_on_draw("a").unwrap();

        let restored = ParticleSet::from_state(set.to_state()).unwrap();
        assert_eq!(restored.particles(), set.particles());
        assert_eq!(restored.marginal_bag(), set.marginal_bag());
    }
}
