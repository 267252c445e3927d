//! Monte Carlo tree search over partial alignments.
//!
//! Each iteration runs four steps:
//!
//! - **Selection**: descend from the root through children maximizing UCB1
//!   until reaching a node with an untried extension
//! - **Expansion**: add the lowest-ranked untried candidate as a new child
//! - **Rollout**: shuffle the feasible candidates off the path once, then add
//!   each one the state still accepts
//! - **Backpropagation**: add the rollout score to every node on the path
//!
//! The best complete state seen anywhere (tree node or rollout) is kept, so
//! the search can stop after any iteration. When the tree has been fully
//! expanded the search stops early with the optimum.

mod node;

use std::sync::Arc;

use linkforge_config::{MonteCarloConfig, DEFAULT_EXPLORATION_CONSTANT, DEFAULT_MAX_ITERATIONS};
use linkforge_constraint::{AnyConstraint, Constraint, ConstraintFactory};
use linkforge_core::{Alignment, AlignmentSet, LinkForgeError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::{prepare, Matcher, Prepared};
use crate::listener::{Level, MatchListener, Stage};

pub use node::SearchNode;

/// Iterations between progress reports.
const PROGRESS_INTERVAL: usize = 10_000;

/// Observed range of rollout rewards, used to normalize UCB1 means.
#[derive(Debug, Clone, Copy)]
struct RewardRange {
    min: f64,
    max: f64,
}

impl RewardRange {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, reward: f64) {
        self.min = self.min.min(reward);
        self.max = self.max.max(reward);
    }

    fn normalize(&self, reward: f64) -> f64 {
        if self.max > self.min {
            (reward - self.min) / (self.max - self.min)
        } else {
            0.5
        }
    }
}

/// Anytime stochastic search bounded by an iteration budget.
///
/// With a fixed seed the run is deterministic, and a larger budget never
/// returns a worse result than a smaller one.
///
/// # Example
///
/// ```
/// use linkforge_constraint::BijectiveConstraint;
/// use linkforge_core::{Alignment, AlignmentSet, EntityRef};
/// use linkforge_solver::{Matcher, MonteCarloTreeSearch};
///
/// let e = |s: &str| EntityRef::new(s, "d");
/// let candidates: AlignmentSet = vec![
///     Alignment::new(e("a"), e("x"), 0.5),
///     Alignment::new(e("a"), e("y"), 0.9),
///     Alignment::new(e("b"), e("y"), 0.7),
/// ]
/// .into();
///
/// let matcher = MonteCarloTreeSearch::new(BijectiveConstraint::default())
///     .with_max_iterations(1_000)
///     .with_seed(7);
/// assert_eq!(matcher.align(&candidates).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MonteCarloTreeSearch<C: Constraint = AnyConstraint> {
    empty: C,
    max_iterations: usize,
    exploration_constant: f64,
    seed: Option<u64>,
    threshold: f64,
}

impl<C: Constraint> MonteCarloTreeSearch<C> {
    /// Creates a search starting from the `empty` state with default budget
    /// and exploration constant.
    pub fn new(empty: C) -> Self {
        Self {
            empty,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            exploration_constant: DEFAULT_EXPLORATION_CONSTANT,
            seed: None,
            threshold: f64::NEG_INFINITY,
        }
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the UCB1 exploration constant.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Seeds the rollout RNG; unseeded runs draw from OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Ignores candidates with a probability below `threshold`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn exploration_constant(&self) -> f64 {
        self.exploration_constant
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        }
    }

    /// The non-exhausted child of `parent` with the highest UCB1 value.
    /// Ties go to the earliest child.
    fn select_child(
        &self,
        tree: &[SearchNode<C>],
        parent: usize,
        rewards: &RewardRange,
    ) -> Option<usize> {
        let ln_visits = (tree[parent].visits().max(1) as f64).ln();
        let mut selected: Option<(usize, f64)> = None;
        for &child in tree[parent].children() {
            let node = &tree[child];
            if node.is_exhausted() {
                continue;
            }
            let value = if node.visits() == 0 {
                f64::INFINITY
            } else {
                rewards.normalize(node.mean_reward())
                    + self.exploration_constant * (ln_visits / node.visits() as f64).sqrt()
            };
            if selected.map_or(true, |(_, best)| value > best) {
                selected = Some((child, value));
            }
        }
        selected.map(|(child, _)| child)
    }

    /// Completes `state` with random feasible candidates not in `taken`.
    fn rollout(
        &self,
        state: &C,
        candidates: &[Arc<Alignment>],
        taken: &[bool],
        rng: &mut ChaCha8Rng,
    ) -> Result<C> {
        let mut pool = Vec::new();
        for (i, candidate) in candidates.iter().enumerate() {
            if !taken[i] && state.can_add(candidate)? {
                pool.push(i);
            }
        }

        // The first still-feasible entry of a random permutation is a
        // uniform draw among the feasible ones.
        pool.shuffle(rng);
        let mut state = state.clone();
        for i in pool {
            if state.can_add(&candidates[i])? {
                state = state.add(Arc::clone(&candidates[i]))?;
            }
        }
        Ok(state)
    }
}

impl MonteCarloTreeSearch<AnyConstraint> {
    /// Creates a matcher from its configuration.
    pub fn from_config(config: &MonteCarloConfig) -> Self {
        Self {
            empty: ConstraintFactory::new(config.constraint.clone()).make(),
            max_iterations: config.max_iterations,
            exploration_constant: config.exploration_constant,
            seed: config.seed,
            threshold: config.threshold,
        }
    }
}

/// Replaces `best` if `state` is complete and strictly better.
fn consider<C: Constraint>(best: &mut Option<C>, state: &C) -> bool {
    if state.is_complete() && best.as_ref().map_or(true, |b| state.score() > b.score()) {
        *best = Some(state.clone());
        true
    } else {
        false
    }
}

impl<C: Constraint> Matcher for MonteCarloTreeSearch<C> {
    fn id(&self) -> &'static str {
        "monte-carlo"
    }

    fn align_with(
        &self,
        candidates: &AlignmentSet,
        committed: &AlignmentSet,
        listener: &dyn MatchListener,
    ) -> Result<AlignmentSet> {
        listener.on_stage(Stage::Initializing);
        info!(
            event = "match_start",
            matcher = self.id(),
            constraint = self.empty.name(),
            candidates = candidates.len(),
            committed = committed.len(),
            max_iterations = self.max_iterations,
            seed = ?self.seed,
        );

        let Prepared { seed, candidates } =
            prepare(&self.empty, self.threshold, candidates, committed, listener)?;

        listener.on_stage(Stage::Matching);
        let mut rng = self.rng();
        let mut best = None;
        consider(&mut best, &seed);
        let mut tree = vec![SearchNode::root(seed, &candidates)?];
        let mut rewards = RewardRange::new();
        let mut taken = vec![false; candidates.len()];
        let mut iterations = 0;

        for iteration in 1..=self.max_iterations {
            if tree[0].is_exhausted() {
                debug!(event = "tree_exhausted", iteration = iteration);
                break;
            }
            iterations = iteration;

            let mut current = 0;
            while !tree[current].has_untried() {
                match self.select_child(&tree, current, &rewards) {
                    Some(child) => current = child,
                    None => break,
                }
            }

            let leaf = match tree[current].pop_untried(&candidates)? {
                Some(rank) => {
                    let state = tree[current].state().add(Arc::clone(&candidates[rank]))?;
                    if consider(&mut best, &state) {
                        listener.on_best_improved(iteration, state.score());
                    }
                    let index = tree.len();
                    tree.push(SearchNode::child(current, state, rank, &candidates)?);
                    tree[current].add_child(index);
                    index
                }
                None => current,
            };

            taken.iter_mut().for_each(|t| *t = false);
            let mut walk = Some(leaf);
            while let Some(i) = walk {
                if let Some(rank) = tree[i].last() {
                    taken[rank] = true;
                }
                walk = tree[i].parent_index();
            }

            let completed = self.rollout(tree[leaf].state(), &candidates, &taken, &mut rng)?;
            let reward = completed.score().value();
            rewards.include(reward);
            if consider(&mut best, &completed) {
                listener.on_best_improved(iteration, completed.score());
            }

            let mut walk = Some(leaf);
            while let Some(i) = walk {
                tree[i].record(reward);
                let done = !tree[i].has_untried()
                    && tree[i].children().iter().all(|&c| tree[c].is_exhausted());
                if done {
                    tree[i].mark_exhausted();
                }
                walk = tree[i].parent_index();
            }

            if iteration % PROGRESS_INTERVAL == 0 {
                let best_score = best.as_ref().map(|b| b.score()).unwrap_or_default();
                debug!(
                    event = "progress",
                    iteration = iteration,
                    nodes = tree.len(),
                    best = %best_score,
                );
                listener.message(
                    Stage::Matching,
                    Level::Info,
                    &format!("iteration {}: best score {}", iteration, best_score),
                );
            }
        }

        let Some(best) = best else {
            listener.on_stage(Stage::Failed);
            return Err(LinkForgeError::UnsolvableConstraint(format!(
                "monte carlo search found no complete {} state",
                self.empty.name()
            )));
        };

        info!(
            event = "match_end",
            matcher = self.id(),
            iterations = iterations,
            nodes = tree.len(),
            alignments = best.len(),
            score = %best.score(),
        );
        listener.on_stage(Stage::Completed);
        Ok(best.alignment_set())
    }
}
