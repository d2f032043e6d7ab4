//! Progressive-widening MCTS over macro-actions.
//!
//! Each simulation descends through nodes that may not grow any further,
//! expands at most one new child from the first node that may, rolls out a
//! short greedy continuation and backs the value up to the root.

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::core::{structural_hash, ConfigError, GameRng, PlayerId};
use crate::rules::{ActionPrior, ContextualPrior, MacroAction, PlanningContext, RulesEngine};

use super::config::{PlannerConfig, TranspositionMode};
use super::diagnostics::{ChildDiagnostics, PlanDiagnostics};
use super::node::{ActionCursor, NodeId};
use super::policy::PriorUcb;
use super::stats::SearchStats;
use super::transposition::{TranspositionEntry, TranspositionTable};
use super::tree::SearchTree;

/// Macro-action planner.
///
/// Generic over the rules engine and the prior used to rescore candidates.
/// Every `plan` call builds a fresh tree from the configured seed, so equal
/// inputs give equal rankings.
pub struct Planner<E, A = ContextualPrior> {
    engine: E,
    config: PlannerConfig,
    prior: A,
    context: Option<PlanningContext>,
    stats: SearchStats,
}

impl<E: RulesEngine> Planner<E> {
    pub fn new(engine: E, config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            prior: ContextualPrior::default(),
            context: None,
            stats: SearchStats::default(),
        })
    }
}

impl<E: RulesEngine, A: ActionPrior> Planner<E, A> {
    /// Replace the prior used to rescore candidates.
    pub fn with_prior<B: ActionPrior>(self, prior: B) -> Planner<E, B> {
        Planner {
            engine: self.engine,
            config: self.config,
            prior,
            context: self.context,
            stats: self.stats,
        }
    }

    pub fn with_context(mut self, context: PlanningContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn set_context(&mut self, context: Option<PlanningContext>) {
        self.context = context;
    }

    #[must_use]
    pub fn context(&self) -> Option<&PlanningContext> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Statistics of the most recent search.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Root candidates ranked by mean backed-up value, best first.
    ///
    /// Only candidates that were expanded during the search appear. An empty
    /// vector means nothing was expanded, either because the engine offered
    /// no candidates or the budget ran out before widening allowed any.
    pub fn plan(&mut self, state: &E::State, player: PlayerId) -> Vec<MacroAction<E::Payload>> {
        let tree = self.build_tree(state, player);
        ranked_children(&tree)
            .into_iter()
            .filter_map(|id| tree.get(id).action.clone())
            .collect()
    }

    /// `plan` plus per-child statistics and the parameters used.
    pub fn plan_with_diagnostics(
        &mut self,
        state: &E::State,
        player: PlayerId,
    ) -> (Vec<MacroAction<E::Payload>>, PlanDiagnostics<E::Payload>) {
        let tree = self.build_tree(state, player);
        let ranked = ranked_children(&tree);

        let mut plan = Vec::with_capacity(ranked.len());
        let mut children = Vec::with_capacity(ranked.len());
        for id in ranked {
            let node = tree.get(id);
            let Some(action) = &node.action else { continue };
            children.push(ChildDiagnostics {
                kind: action.kind,
                prior: node.prior,
                visits: node.visits,
                mean_value: node.mean_value(),
                payload: action.payload.clone(),
            });
            plan.push(action.clone());
        }

        let diagnostics = PlanDiagnostics::new(
            &self.config,
            self.context.clone(),
            children,
            self.stats.clone(),
            tree.stats(),
        );
        (plan, diagnostics)
    }

    /// Run the full simulation budget and return the resulting tree.
    pub fn build_tree(&mut self, state: &E::State, player: PlayerId) -> SearchTree<E::State, E::Payload> {
        let start = Instant::now();
        self.stats.reset();

        let mut rng = GameRng::new(self.config.seed);
        let root_state = self.engine.determinize(state, &mut rng);
        let root_hash = structural_hash(&root_state);
        let capacity = self.config.simulations as usize + 1;
        let mut tree = SearchTree::with_capacity(root_state, root_hash, capacity);
        let mut table = TranspositionTable::new();

        for sim in 0..self.config.simulations {
            self.simulate(&mut tree, &mut table, player, sim);
            self.stats.simulations += 1;
        }

        self.stats.transposition_entries = table.len();
        self.stats.time_us = start.elapsed().as_micros() as u64;

        let root = tree.root_node();
        debug!(
            player = %player,
            simulations = self.stats.simulations,
            root_children = root.children.len(),
            nodes = tree.len(),
            evaluator_failures = self.stats.evaluator_failures,
            time_us = self.stats.time_us,
            "plan search finished"
        );
        tree
    }

    /// One simulation: select, expand, roll out, back up.
    fn simulate(
        &mut self,
        tree: &mut SearchTree<E::State, E::Payload>,
        table: &mut TranspositionTable,
        player: PlayerId,
        sim: u32,
    ) {
        let (pw_c, pw_alpha) = (self.config.pw_c, self.config.pw_alpha);
        let mut node = tree.root();

        loop {
            let current = tree.get(node);
            if current.children.is_empty() || current.can_expand(pw_c, pw_alpha) {
                break;
            }
            match self.select_child(tree, table, node) {
                Some(child) => node = child,
                None => break,
            }
        }

        if tree.get(node).can_expand(pw_c, pw_alpha) {
            if let Some(child) = self.expand(tree, node, player) {
                node = child;
            }
        }

        let value = self.rollout(&tree.get(node).state, player);
        self.backup(tree, table, node, value);

        trace!(sim, node = %node, depth = tree.get(node).depth, value, "simulation");
    }

    fn select_child(
        &self,
        tree: &SearchTree<E::State, E::Payload>,
        table: &TranspositionTable,
        node: NodeId,
    ) -> Option<NodeId> {
        let parent = tree.get(node);
        let share = self.config.transposition == TranspositionMode::Share;
        let policy = PriorUcb::new(self.config.exploration, self.config.prior_scale);

        let idx = policy.select(
            parent.visits,
            parent.children.iter().map(|&id| {
                let child = tree.get(id);
                let mean = if share {
                    table.get(child.hash).map_or(child.mean_value(), TranspositionEntry::mean)
                } else {
                    child.mean_value()
                };
                (mean, child.visits, child.prior)
            }),
        )?;
        parent.children.get(idx).copied()
    }

    /// Pull the next candidate from `node`'s cursor and add it as a child.
    ///
    /// Returns `None` and marks the node exhausted when no candidates remain.
    fn expand(
        &mut self,
        tree: &mut SearchTree<E::State, E::Payload>,
        node: NodeId,
        player: PlayerId,
    ) -> Option<NodeId> {
        if tree.get(node).cursor.is_none() {
            let candidates = self.rescored_candidates(&tree.get(node).state, player);
            tree.get_mut(node).cursor = Some(ActionCursor::new(candidates));
        }

        let Some(action) = tree.get_mut(node).cursor.as_mut().and_then(ActionCursor::advance) else {
            tree.get_mut(node).fully_expanded = true;
            self.stats.exhausted_nodes += 1;
            return None;
        };

        let parent_state = &tree.get(node).state;
        let state = if action.is_pass() {
            parent_state.clone()
        } else {
            self.engine.apply_action(parent_state, player, &action)
        };
        let hash = structural_hash(&state);
        let child = tree.add_child(node, state, hash, action);

        self.stats.expansions += 1;
        self.stats.max_depth = self.stats.max_depth.max(tree.get(child).depth);
        Some(child)
    }

    /// Greedy highest-prior continuation, then evaluate.
    ///
    /// Stops early on a pass or when no candidates remain. Evaluation
    /// failures and non-finite values count as 0.
    fn rollout(&mut self, leaf: &E::State, player: PlayerId) -> f64 {
        let mut state = leaf.clone();
        for _ in 0..self.config.rollout_depth {
            let best = self
                .rescored_candidates(&state, player)
                .into_iter()
                .reduce(|best, a| if a.prior > best.prior { a } else { best });
            match best {
                Some(action) if !action.is_pass() => {
                    state = self.engine.apply_action(&state, player, &action);
                }
                _ => break,
            }
        }
        self.stats.rollouts += 1;

        match self.engine.evaluate(&state, player) {
            Ok(value) if value.is_finite() => value,
            Ok(value) => {
                warn!(value, "evaluator returned a non-finite value, scoring 0");
                self.stats.evaluator_failures += 1;
                0.0
            }
            Err(err) => {
                warn!(error = %err, "leaf evaluation failed, scoring 0");
                self.stats.evaluator_failures += 1;
                0.0
            }
        }
    }

    fn backup(
        &self,
        tree: &mut SearchTree<E::State, E::Payload>,
        table: &mut TranspositionTable,
        leaf: NodeId,
        value: f64,
    ) {
        let record = self.config.transposition != TranspositionMode::Off;
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = tree.get_mut(id);
            node.visits += 1;
            node.value_sum += value;
            if record {
                table.record(node.hash, value);
            }
            current = node.parent;
        }
    }

    fn rescored_candidates(&self, state: &E::State, player: PlayerId) -> Vec<MacroAction<E::Payload>> {
        let context = self.context.as_ref();
        self.engine
            .candidate_actions(state, player)
            .into_iter()
            .map(|mut action| {
                action.prior = self.prior.score(&action, context);
                action
            })
            .collect()
    }
}

/// Root children sorted by mean value, best first. Ties keep expansion order.
fn ranked_children<S, P>(tree: &SearchTree<S, P>) -> Vec<NodeId> {
    let mut children = tree.root_node().children.to_vec();
    children.sort_by(|a, b| tree.get(*b).mean_value().total_cmp(&tree.get(*a).mean_value()));
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EvaluationError;
    use crate::mcts::node::widening_limit;
    use crate::rules::{ActionKind, EnginePrior, ThreatMap};

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Counter {
        total: i32,
        moves: u32,
    }

    /// Adds the payload to a running total. Offers its actions until `max_moves`.
    struct CounterGame {
        actions: Vec<(ActionKind, i32, f64)>,
        max_moves: u32,
        fail: bool,
    }

    impl CounterGame {
        fn new(actions: Vec<(ActionKind, i32, f64)>) -> Self {
            Self { actions, max_moves: u32::MAX, fail: false }
        }
    }

    impl RulesEngine for CounterGame {
        type State = Counter;
        type Payload = i32;

        fn candidate_actions(&self, state: &Counter, _player: PlayerId) -> Vec<MacroAction<i32>> {
            if state.moves >= self.max_moves {
                return Vec::new();
            }
            self.actions
                .iter()
                .map(|&(kind, delta, prior)| MacroAction::new(kind, delta).with_prior(prior))
                .collect()
        }

        fn apply_action(&self, state: &Counter, _player: PlayerId, action: &MacroAction<i32>) -> Counter {
            Counter {
                total: state.total + action.payload,
                moves: state.moves + 1,
            }
        }

        fn evaluate(&self, state: &Counter, _player: PlayerId) -> Result<f64, EvaluationError> {
            if self.fail {
                return Err(EvaluationError::Unavailable("offline".into()));
            }
            Ok(f64::from(state.total) / 10.0)
        }
    }

    fn start() -> Counter {
        Counter { total: 0, moves: 0 }
    }

    fn planner(game: CounterGame, sims: u32) -> Planner<CounterGame> {
        Planner::new(game, PlannerConfig::default().with_simulations(sims).with_seed(3)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let game = CounterGame::new(vec![]);
        assert!(Planner::new(game, PlannerConfig::default().with_simulations(0)).is_err());
    }

    #[test]
    fn test_no_candidates_gives_empty_plan() {
        let mut planner = planner(CounterGame::new(vec![]), 20);
        let tree = planner.build_tree(&start(), PlayerId::new(0));

        assert!(tree.root_node().children.is_empty());
        assert!(tree.root_node().fully_expanded);
        assert_eq!(tree.root_node().visits, 20);
        assert!(planner.plan(&start(), PlayerId::new(0)).is_empty());
    }

    #[test]
    fn test_single_simulation_only_evaluates_root() {
        let game = CounterGame::new(vec![(ActionKind::Build, 1, 0.9)]);
        let mut planner = planner(game, 1);

        assert!(planner.plan(&start(), PlayerId::new(0)).is_empty());
        assert_eq!(planner.stats().rollouts, 1);
        assert_eq!(planner.stats().expansions, 0);
    }

    #[test]
    fn test_one_shot_ranking_by_mean() {
        let mut game = CounterGame::new(vec![
            (ActionKind::Build, 1, 0.9),
            (ActionKind::Explore, 5, 0.3),
        ]);
        game.max_moves = 1;
        let mut planner = planner(game, 60).with_prior(EnginePrior);

        let (plan, diagnostics) = planner.plan_with_diagnostics(&start(), PlayerId::new(0));

        let payloads: Vec<i32> = plan.iter().map(|a| a.payload).collect();
        assert_eq!(payloads, vec![5, 1]);
        assert_eq!(diagnostics.children.len(), 2);
        assert!((diagnostics.children[0].mean_value - 0.5).abs() < 1e-12);
        assert!((diagnostics.children[1].mean_value - 0.1).abs() < 1e-12);
        assert_eq!(diagnostics.best().map(|c| c.kind), Some(ActionKind::Explore));
        assert_eq!(diagnostics.simulations, 60);
    }

    #[test]
    fn test_visits_and_widening_invariants() {
        let game = CounterGame::new(vec![
            (ActionKind::Build, 1, 0.9),
            (ActionKind::Explore, 3, 0.4),
            (ActionKind::Research, 2, 0.6),
            (ActionKind::Pass, 0, 0.0),
        ]);
        let mut planner = planner(game, 150);
        let tree = planner.build_tree(&start(), PlayerId::new(0));
        let config = planner.config().clone();

        assert_eq!(tree.root_node().visits, 150);
        for (_, node) in tree.iter() {
            assert!(node.children.len() <= widening_limit(node.visits, config.pw_c, config.pw_alpha));
            let child_visits: u32 = node.children.iter().map(|&c| tree.get(c).visits).sum();
            assert!(child_visits <= node.visits);
        }

        let plan = planner.plan(&start(), PlayerId::new(0));
        assert_eq!(plan.len(), tree.root_node().children.len());
    }

    #[test]
    fn test_pass_child_keeps_parent_state() {
        let game = CounterGame::new(vec![(ActionKind::Pass, 7, 0.9)]);
        let mut planner = planner(game, 10);
        let tree = planner.build_tree(&start(), PlayerId::new(0));

        let child = tree.root_node().children[0];
        assert_eq!(tree.get(child).state, start());
        assert_eq!(tree.get(child).hash, tree.root_node().hash);
    }

    #[test]
    fn test_first_expansion_follows_contextual_prior() {
        let game = CounterGame::new(vec![
            (ActionKind::Explore, 1, 0.9),
            (ActionKind::Build, 1, 0.1),
        ]);
        let threatened = PlanningContext::new().with_threat(ThreatMap::new().with_danger(PlayerId::new(1), 1.0));

        let mut plain = planner(CounterGame::new(game.actions.clone()), 5);
        let tree = plain.build_tree(&start(), PlayerId::new(0));
        let first = tree.get(tree.root_node().children[0]);
        assert_eq!(first.action.as_ref().map(|a| a.kind), Some(ActionKind::Explore));

        let mut contextual = planner(game, 5).with_context(threatened);
        let tree = contextual.build_tree(&start(), PlayerId::new(0));
        let first = tree.get(tree.root_node().children[0]);
        assert_eq!(first.action.as_ref().map(|a| a.kind), Some(ActionKind::Build));
        assert!((first.prior - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_evaluator_failure_scores_zero() {
        let mut game = CounterGame::new(vec![(ActionKind::Build, 4, 0.9), (ActionKind::Explore, 2, 0.5)]);
        game.fail = true;
        let mut planner = planner(game, 30);

        let (plan, diagnostics) = planner.plan_with_diagnostics(&start(), PlayerId::new(0));
        assert!(!plan.is_empty());
        assert!(diagnostics.children.iter().all(|c| c.mean_value == 0.0));
        assert_eq!(diagnostics.stats.evaluator_failures, 30);
    }

    #[test]
    fn test_deterministic_for_equal_inputs() {
        let actions = vec![
            (ActionKind::Build, 1, 0.5),
            (ActionKind::Explore, 2, 0.5),
            (ActionKind::Research, -1, 0.5),
        ];
        let mut a = planner(CounterGame::new(actions.clone()), 80);
        let mut b = planner(CounterGame::new(actions), 80);

        let plan_a: Vec<i32> = a.plan(&start(), PlayerId::new(0)).into_iter().map(|x| x.payload).collect();
        let plan_b: Vec<i32> = b.plan(&start(), PlayerId::new(0)).into_iter().map(|x| x.payload).collect();
        assert_eq!(plan_a, plan_b);
    }

    #[test]
    fn test_transposition_modes() {
        let actions = vec![(ActionKind::Build, 1, 0.6), (ActionKind::Explore, 1, 0.4)];
        for mode in [TranspositionMode::Off, TranspositionMode::Record, TranspositionMode::Share] {
            let config = PlannerConfig::default().with_simulations(60).with_transposition(mode);
            let mut planner = Planner::new(CounterGame::new(actions.clone()), config).unwrap();
            let plan = planner.plan(&start(), PlayerId::new(0));

            assert_eq!(plan.len(), 2);
            let entries = planner.stats().transposition_entries;
            if mode == TranspositionMode::Off {
                assert_eq!(entries, 0);
            } else {
                // Both actions add 1, so their children share one state.
                assert!(entries > 0 && entries < planner.stats().expansions as usize + 1);
            }
        }
    }
}
