//! Child selection score.

/// UCB1 with a decaying prior bonus:
///
/// ```text
/// mean + c * sqrt(ln(N + 1) / (n + 1)) + prior_scale * prior / (1 + n)
/// ```
///
/// where `N` is the parent's visit count and `n` the child's.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriorUcb {
    pub exploration: f64,
    pub prior_scale: f64,
}

impl PriorUcb {
    #[must_use]
    pub fn new(exploration: f64, prior_scale: f64) -> Self {
        Self { exploration, prior_scale }
    }

    #[must_use]
    pub fn score(&self, mean: f64, parent_visits: u32, child_visits: u32, prior: f64) -> f64 {
        let n = f64::from(child_visits);
        let explore = (f64::from(parent_visits) + 1.0).ln() / (n + 1.0);
        mean + self.exploration * explore.sqrt() + self.prior_scale * prior / (1.0 + n)
    }

    /// Index of the highest-scoring child; the first one wins ties.
    ///
    /// `children` yields `(mean, visits, prior)` per child.
    pub fn select<I>(&self, parent_visits: u32, children: I) -> Option<usize>
    where
        I: IntoIterator<Item = (f64, u32, f64)>,
    {
        let mut best: Option<(usize, f64)> = None;
        for (idx, (mean, visits, prior)) in children.into_iter().enumerate() {
            let score = self.score(mean, parent_visits, visits, prior);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unvisited_child_gets_prior_bonus() {
        let policy = PriorUcb::new(1.414, 0.5);
        let with_prior = policy.score(0.0, 10, 0, 0.8);
        let without = policy.score(0.0, 10, 0, 0.0);
        assert!((with_prior - without - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_score_formula() {
        let policy = PriorUcb::new(2.0, 1.0);
        let expected = 0.25 + 2.0 * ((4.0f64).ln() / 2.0).sqrt() + 0.5 / 2.0;
        assert!((policy.score(0.25, 3, 1, 0.5) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_select_prefers_first_on_tie() {
        let policy = PriorUcb::new(1.0, 0.5);
        assert_eq!(policy.select(4, [(0.5, 2, 0.3), (0.5, 2, 0.3)]), Some(0));
        assert_eq!(policy.select(4, [(0.1, 2, 0.3), (0.9, 2, 0.3)]), Some(1));
        assert_eq!(policy.select(4, std::iter::empty()), None);
    }
}
