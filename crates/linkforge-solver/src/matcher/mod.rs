//! Matcher strategies.
//!
//! A matcher chooses, from scored candidate alignments, a subset that a
//! constraint policy accepts. Every strategy:
//!
//! - keeps the committed alignments verbatim and checks them first
//! - drops candidates whose relation the policy does not model (with a
//!   warning) instead of failing
//! - considers candidates in a deterministic order: probability descending,
//!   then left entity, right entity and relation ascending

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use linkforge_constraint::Constraint;
use linkforge_core::{Alignment, AlignmentSet, LinkForgeError, Result};
use tracing::{trace, warn};

use crate::listener::{Level, MatchListener, NoOpListener, Stage};

pub mod beam;
pub mod mcts;
pub mod threshold;
pub mod unique;

pub use beam::BeamSearch;
pub use mcts::MonteCarloTreeSearch;
pub use threshold::ThresholdMatcher;
pub use unique::UniqueAssignment;

#[cfg(test)]
mod tests;

/// Chooses a feasible subset of candidate alignments.
pub trait Matcher: Send + Sync + Debug {
    /// Registry name of the strategy.
    fn id(&self) -> &'static str;

    /// Aligns `candidates`, extending the `committed` alignments.
    ///
    /// The result contains every committed alignment unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LinkForgeError::UnsolvableConstraint`] if the committed
    /// alignments already violate the policy or no complete state exists.
    fn align_with(
        &self,
        candidates: &AlignmentSet,
        committed: &AlignmentSet,
        listener: &dyn MatchListener,
    ) -> Result<AlignmentSet>;

    /// Aligns `candidates` from scratch.
    fn align(&self, candidates: &AlignmentSet) -> Result<AlignmentSet> {
        self.align_with(candidates, &AlignmentSet::new(), &NoOpListener)
    }
}

/// The starting point of a constrained search.
#[derive(Debug)]
pub(crate) struct Prepared<C> {
    /// The empty state with every committed alignment added.
    pub seed: C,
    /// Remaining candidates in rank order.
    pub candidates: Vec<Arc<Alignment>>,
}

/// Folds `committed` into `empty` and filters `candidates`.
///
/// Candidates are dropped if they share a link with a committed alignment,
/// fall below `threshold`, or carry a relation the policy rejects outright.
pub(crate) fn prepare<C: Constraint>(
    empty: &C,
    threshold: f64,
    candidates: &AlignmentSet,
    committed: &AlignmentSet,
    listener: &dyn MatchListener,
) -> Result<Prepared<C>> {
    let mut seed = empty.clone();
    let mut committed_order: Vec<&Alignment> = committed.iter().collect();
    committed_order.sort_by(|a, b| a.rank_cmp(b));
    for alignment in committed_order {
        let feasible = match seed.can_add(alignment) {
            Ok(feasible) => feasible,
            Err(e) if e.is_candidate_rejection() => false,
            Err(e) => return Err(e),
        };
        if !feasible {
            let message = format!(
                "committed alignment {} is not valid with the {} constraint",
                alignment,
                seed.name()
            );
            warn!(event = "committed_conflict", alignment = %alignment, constraint = seed.name());
            listener.message(Stage::Initializing, Level::Critical, &message);
            listener.on_stage(Stage::Failed);
            return Err(LinkForgeError::UnsolvableConstraint(message));
        }
        seed = seed.add(Arc::new(alignment.clone()))?;
    }

    let mut unsupported: BTreeMap<String, usize> = BTreeMap::new();
    let mut kept = Vec::with_capacity(candidates.len());
    for alignment in candidates {
        if links_committed(committed, alignment) {
            continue;
        }
        if alignment.probability() < threshold {
            continue;
        }
        match seed.can_add(alignment) {
            Err(LinkForgeError::UnsupportedRelation { relation }) => {
                *unsupported.entry(relation).or_insert(0) += 1;
            }
            Err(e) => return Err(e),
            Ok(_) => kept.push(Arc::new(alignment.clone())),
        }
    }

    for (relation, count) in &unsupported {
        let message = format!(
            "dropped {} candidate(s) with relation {} unsupported by the {} constraint",
            count,
            relation,
            seed.name()
        );
        warn!(event = "candidates_dropped", relation = %relation, count = count);
        listener.message(Stage::Matching, Level::Warning, &message);
    }

    kept.sort_by(|a, b| a.rank_cmp(b));
    trace!(
        event = "prepared",
        committed = seed.len(),
        candidates = kept.len()
    );
    Ok(Prepared {
        seed,
        candidates: kept,
    })
}

/// Returns true if `committed` already decides the link of `alignment`.
pub(crate) fn links_committed(committed: &AlignmentSet, alignment: &Alignment) -> bool {
    !committed.is_empty()
        && committed.contains_link(alignment.entity1(), alignment.entity2(), alignment.relation())
}

/// Returns the indices of `candidates` after `after` that `state` accepts.
pub(crate) fn feasible_after<C: Constraint>(
    state: &C,
    candidates: &[Arc<Alignment>],
    after: Option<usize>,
) -> Result<Vec<usize>> {
    let start = after.map_or(0, |i| i + 1);
    let mut out = Vec::new();
    for (i, candidate) in candidates.iter().enumerate().skip(start) {
        if state.can_add(candidate)? {
            out.push(i);
        }
    }
    Ok(out)
}
