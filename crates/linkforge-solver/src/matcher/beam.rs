//! Beam search - level-by-level best-first expansion.

use std::sync::Arc;

use linkforge_config::BeamSearchConfig;
use linkforge_constraint::{AnyConstraint, Constraint, ConstraintFactory};
use linkforge_core::{Alignment, AlignmentScore, AlignmentSet, LinkForgeError, Result};
use rayon::prelude::*;
use tracing::{debug, info};

use super::{feasible_after, prepare, Matcher, Prepared};
use crate::frontier::BoundedFrontier;
use crate::listener::{MatchListener, Stage};

/// A partial solution and the rank of the last candidate added to it.
#[derive(Debug, Clone)]
struct Branch<C> {
    state: C,
    last: Option<usize>,
}

impl<C: Constraint> Branch<C> {
    /// All one-alignment extensions, in candidate rank order.
    ///
    /// Only candidates ranked after `last` are tried, so every subset is
    /// generated by exactly one path.
    fn expand(&self, candidates: &[Arc<Alignment>]) -> Result<Vec<Branch<C>>> {
        feasible_after(&self.state, candidates, self.last)?
            .into_iter()
            .map(|i| {
                Ok(Branch {
                    state: self.state.add(Arc::clone(&candidates[i]))?,
                    last: Some(i),
                })
            })
            .collect()
    }
}

/// Keeps the `width` best partial solutions per depth level.
///
/// Each level extends every kept state by one more alignment; the
/// expansion of a level runs in parallel and is trimmed only once all of
/// its children exist. The search stops when no state can be extended and
/// returns the best complete state generated at any level.
///
/// Without a width the search is exhaustive and the result is optimal.
/// A finite width bounds memory and time at the cost of optimality: with
/// width 1 the search degenerates into a greedy walk.
#[derive(Debug, Clone)]
pub struct BeamSearch<C: Constraint = AnyConstraint> {
    empty: C,
    width: Option<usize>,
    threshold: f64,
}

impl<C: Constraint> BeamSearch<C> {
    /// Creates an exhaustive search starting from the `empty` state.
    pub fn new(empty: C) -> Self {
        Self {
            empty,
            width: None,
            threshold: f64::NEG_INFINITY,
        }
    }

    /// Keeps at most `width` states per level.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Ignores candidates with a probability below `threshold`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the beam width, `None` meaning unbounded.
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// Returns the empty policy state.
    pub fn empty(&self) -> &C {
        &self.empty
    }
}

impl BeamSearch<AnyConstraint> {
    /// Creates a matcher from its configuration.
    pub fn from_config(config: &BeamSearchConfig) -> Self {
        Self {
            empty: ConstraintFactory::new(config.constraint.clone()).make(),
            width: config.width,
            threshold: config.threshold,
        }
    }
}

impl<C: Constraint> Matcher for BeamSearch<C> {
    fn id(&self) -> &'static str {
        "beam-search"
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
            width = ?self.width,
        );

        let Prepared { seed, candidates } =
            prepare(&self.empty, self.threshold, candidates, committed, listener)?;

        listener.on_stage(Stage::Matching);
        let mut best = seed.is_complete().then(|| seed.clone());
        let mut frontier = BoundedFrontier::unbounded();
        let score = seed.score();
        frontier.add(
            Branch {
                state: seed,
                last: None,
            },
            score,
        );

        let mut depth = 0;
        loop {
            let parents: Vec<Branch<C>> = frontier.into_best_first().map(|(b, _)| b).collect();
            let children = parents
                .par_iter()
                .map(|parent| parent.expand(&candidates))
                .collect::<Result<Vec<_>>>()?;

            let mut next = BoundedFrontier::unbounded();
            for child in children.into_iter().flatten() {
                let score = child.state.score();
                if child.state.is_complete()
                    && best.as_ref().map_or(true, |b| score > b.score())
                {
                    best = Some(child.state.clone());
                    listener.on_best_improved(depth + 1, score);
                }
                next.add(child, score);
            }
            if next.is_empty() {
                break;
            }

            depth += 1;
            let generated = next.len();
            frontier = match self.width {
                Some(width) => next.trim(width),
                None => next,
            };
            let best_score = best.as_ref().map_or(AlignmentScore::ZERO, |b| b.score());
            debug!(
                event = "beam_level",
                depth = depth,
                generated = generated,
                kept = frontier.len(),
                best = %best_score,
            );
            listener.on_level_completed(depth, frontier.len(), best_score);
        }

        let Some(best) = best else {
            listener.on_stage(Stage::Failed);
            return Err(LinkForgeError::UnsolvableConstraint(format!(
                "beam search found no complete {} state",
                self.empty.name()
            )));
        };

        info!(
            event = "match_end",
            matcher = self.id(),
            depth = depth,
            alignments = best.len(),
            score = %best.score(),
        );
        listener.on_stage(Stage::Completed);
        Ok(best.alignment_set())
    }
}
