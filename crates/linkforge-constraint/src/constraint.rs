//! The `Constraint` trait.

use std::fmt::Debug;
use std::sync::Arc;

use linkforge_core::{delta, Alignment, AlignmentScore, AlignmentSet, LinkForgeError, Result};

use crate::branch::CommitLog;

/// A constraint state: the running score of a partial solution plus
/// whatever a policy needs to decide how that solution may be extended.
///
/// States are immutable snapshots. [`add`](Constraint::add) returns a new
/// state and leaves `self` untouched, so a search can branch any number of
/// children off one ancestor. Clones are cheap (reference counted).
///
/// # Protocol
///
/// 1. Obtain an empty state from the policy (or [`crate::ConstraintFactory`])
/// 2. Probe candidates with `can_add`, as often as needed
/// 3. Commit a feasible candidate with `add`, which fails with
///    [`LinkForgeError::InfeasibleAlignment`] if `can_add` is false
///
/// The score always equals the sum of [`delta`] over the committed
/// alignments.
pub trait Constraint: Clone + Debug + Send + Sync {
    /// Registry name of the policy.
    fn name(&self) -> &'static str;

    /// The committed alignments and their score.
    fn commits(&self) -> &CommitLog;

    /// Returns true if `alignment` can be added to this state.
    ///
    /// Returns [`LinkForgeError::UnsupportedRelation`] if the policy does not
    /// model the alignment's relation at all.
    fn can_add(&self, alignment: &Alignment) -> Result<bool>;

    /// Returns a new state with `alignment` committed.
    fn add(&self, alignment: Arc<Alignment>) -> Result<Self>;

    /// Running score of this state.
    fn score(&self) -> AlignmentScore {
        self.commits().score()
    }

    /// Score change that adding `alignment` would cause.
    fn delta(&self, alignment: &Alignment) -> f64 {
        delta(alignment.probability())
    }

    /// The committed alignments, in commit order.
    fn alignments(&self) -> Vec<Arc<Alignment>> {
        self.commits().to_vec()
    }

    /// The committed alignments as a set.
    fn alignment_set(&self) -> AlignmentSet {
        self.commits().to_alignment_set()
    }

    /// Number of committed alignments.
    fn len(&self) -> usize {
        self.commits().len()
    }

    /// Returns true if nothing has been committed.
    fn is_empty(&self) -> bool {
        self.commits().is_empty()
    }

    /// Returns true if this state is an acceptable final answer.
    fn is_complete(&self) -> bool {
        true
    }

    /// Returns true if the state after adding `alignment` would be complete.
    fn can_complete(&self, _alignment: &Alignment) -> bool {
        true
    }

    /// Returns true if feasibility is exactly "each entity used at most once
    /// on each side", which allows solving by bipartite assignment.
    fn is_one_to_one(&self) -> bool {
        false
    }
}

/// The error `add` returns for an alignment `can_add` rejects.
pub fn infeasible(alignment: &Alignment) -> LinkForgeError {
    LinkForgeError::InfeasibleAlignment {
        entity1: alignment.entity1().to_string(),
        entity2: alignment.entity2().to_string(),
        relation: alignment.relation().to_string(),
    }
}
