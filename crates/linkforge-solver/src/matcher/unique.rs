//! Unique assignment and plain greedy - one pass over the ranked candidates.

use std::collections::HashMap;
use std::sync::Arc;

use linkforge_config::UniqueConfig;
use linkforge_constraint::{AnyConstraint, Constraint, ConstraintFactory};
use linkforge_core::{Alignment, AlignmentSet, EntityRef, LinkForgeError, Result};
use tracing::{debug, info, trace, warn};

use super::{prepare, Matcher, Prepared};
use crate::assignment::{max_weight_matching, Edge};
use crate::listener::{Level, MatchListener, Stage};

/// Extends the committed alignments with every candidate the policy still
/// accepts, best candidates first, never revisiting a decision.
///
/// When the policy is strict one-to-one the candidates are first solved as
/// a maximum-weight bipartite assignment, which makes the result optimal
/// for that policy. For every other policy the pass is a sorted greedy
/// scan: maximal, but only a heuristic with respect to total score.
/// [`UniqueAssignment::greedy`] runs that scan under every policy.
///
/// # Example
///
/// ```
/// use linkforge_constraint::BijectiveConstraint;
/// use linkforge_core::{Alignment, AlignmentSet, EntityRef};
/// use linkforge_solver::{Matcher, UniqueAssignment};
///
/// let e = |s: &str| EntityRef::new(s, "d");
/// let candidates: AlignmentSet = vec![
///     Alignment::new(e("a"), e("x"), 0.5),
///     Alignment::new(e("a"), e("y"), 0.9),
///     Alignment::new(e("b"), e("y"), 0.7),
/// ]
/// .into();
///
/// let matcher = UniqueAssignment::new(BijectiveConstraint::default());
/// let result = matcher.align(&candidates).unwrap();
/// assert_eq!(result.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct UniqueAssignment<C: Constraint = AnyConstraint> {
    empty: C,
    threshold: f64,
    exact: bool,
}

impl<C: Constraint> UniqueAssignment<C> {
    /// Creates a matcher starting every run from the `empty` state.
    pub fn new(empty: C) -> Self {
        Self {
            empty,
            threshold: f64::NEG_INFINITY,
            exact: true,
        }
    }

    /// Creates a plain greedy matcher (id `greedy`) that never solves the
    /// candidates as an assignment problem.
    pub fn greedy(empty: C) -> Self {
        Self::new(empty).with_exact(false)
    }

    /// Enables or disables exact assignment for one-to-one policies.
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Ignores candidates with a probability below `threshold`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the empty policy state.
    pub fn empty(&self) -> &C {
        &self.empty
    }

    /// Commits the maximum-weight one-to-one subset of `candidates`.
    fn assign(
        &self,
        seed: C,
        candidates: &[Arc<Alignment>],
        listener: &dyn MatchListener,
    ) -> Result<C> {
        let mut left: HashMap<&EntityRef, usize> = HashMap::new();
        let mut right: HashMap<&EntityRef, usize> = HashMap::new();
        let mut edges = Vec::with_capacity(candidates.len());
        let mut sources = Vec::with_capacity(candidates.len());

        for (i, candidate) in candidates.iter().enumerate() {
            if !seed.can_add(candidate)? {
                continue;
            }
            let n = left.len();
            let l = *left.entry(candidate.entity1()).or_insert(n);
            let m = right.len();
            let r = *right.entry(candidate.entity2()).or_insert(m);
            edges.push(Edge {
                left: l,
                right: r,
                weight: seed.delta(candidate),
            });
            sources.push(i);
        }

        let matching = max_weight_matching(&edges);
        debug!(
            event = "assignment",
            edges = edges.len(),
            chosen = matching.edges.len(),
            greedy_components = matching.greedy_components,
        );
        if matching.greedy_components > 0 {
            let message = format!(
                "{} component(s) too large for exact assignment were solved greedily",
                matching.greedy_components
            );
            warn!(event = "assignment_fallback", components = matching.greedy_components);
            listener.message(Stage::Matching, Level::Warning, &message);
        }

        let mut chosen: Vec<usize> = matching.edges.iter().map(|&e| sources[e]).collect();
        chosen.sort_unstable();

        let mut state = seed;
        for i in chosen {
            let candidate = &candidates[i];
            if state.can_add(candidate)? {
                state = state.add(Arc::clone(candidate))?;
            }
        }
        Ok(state)
    }
}

impl UniqueAssignment<AnyConstraint> {
    /// Creates a matcher from its configuration.
    pub fn from_config(config: &UniqueConfig) -> Self {
        Self::new(ConstraintFactory::new(config.constraint.clone()).make())
            .with_threshold(config.threshold)
    }
}

impl Default for UniqueAssignment<AnyConstraint> {
    fn default() -> Self {
        Self::from_config(&UniqueConfig::default())
    }
}

impl<C: Constraint> Matcher for UniqueAssignment<C> {
    fn id(&self) -> &'static str {
        if self.exact {
            "unique"
        } else {
            "greedy"
        }
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
        );

        let Prepared { seed, candidates } =
            prepare(&self.empty, self.threshold, candidates, committed, listener)?;

        listener.on_stage(Stage::Matching);
        let mut state = if self.exact && seed.is_one_to_one() {
            self.assign(seed, &candidates, listener)?
        } else {
            seed
        };

        // Fill with whatever is still feasible.
        for candidate in &candidates {
            let accepted = state.can_add(candidate)?;
            trace!(event = "step", alignment = %candidate, accepted = accepted);
            if accepted {
                state = state.add(Arc::clone(candidate))?;
            }
        }

        if !state.is_complete() {
            listener.on_stage(Stage::Failed);
            return Err(LinkForgeError::UnsolvableConstraint(format!(
                "{} found no complete {} state",
                self.id(),
                self.empty.name()
            )));
        }

        info!(
            event = "match_end",
            matcher = self.id(),
            alignments = state.len(),
            score = %state.score(),
        );
        listener.on_stage(Stage::Completed);
        Ok(state.alignment_set())
    }
}
