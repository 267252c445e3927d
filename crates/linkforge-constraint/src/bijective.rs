//! Bijective constraint - no entity linked twice on a checked side.

use std::sync::Arc;

use linkforge_config::Surjection;
use linkforge_core::{Alignment, EntityRef, Result};

use crate::branch::{BranchIndex, CommitLog};
use crate::constraint::{infeasible, Constraint};

/// One-to-one linking, optionally relaxed.
///
/// The strict policy keeps both the left and the right entity sets
/// injective. [`Surjection::Surjective`] stops checking the right side (many
/// left entities may share one right entity); [`Surjection::InverseSurjective`]
/// stops checking the left side.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use linkforge_constraint::{BijectiveConstraint, Constraint};
/// use linkforge_core::{Alignment, EntityRef};
///
/// let r = |s: &str| EntityRef::new(s, "ds");
/// let empty = BijectiveConstraint::default();
/// let state = empty
///     .add(Arc::new(Alignment::new(r("a"), r("b"), 1.0)))
///     .unwrap();
///
/// assert!(!state.can_add(&Alignment::new(r("a"), r("c"), 1.0)).unwrap());
/// assert!(!state.can_add(&Alignment::new(r("c"), r("b"), 1.0)).unwrap());
/// assert!(empty.can_add(&Alignment::new(r("a"), r("c"), 1.0)).unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct BijectiveConstraint {
    surjection: Surjection,
    left: BranchIndex<EntityRef, ()>,
    right: BranchIndex<EntityRef, ()>,
    log: CommitLog,
}

impl BijectiveConstraint {
    /// Creates an empty state with the given relaxation.
    pub fn new(surjection: Surjection) -> Self {
        Self {
            surjection,
            ..Self::default()
        }
    }

    /// Returns the relaxation in force.
    pub fn surjection(&self) -> Surjection {
        self.surjection
    }

    fn checks_left(&self) -> bool {
        self.surjection != Surjection::InverseSurjective
    }

    fn checks_right(&self) -> bool {
        self.surjection != Surjection::Surjective
    }
}

impl Constraint for BijectiveConstraint {
    fn name(&self) -> &'static str {
        "bijective"
    }

    fn commits(&self) -> &CommitLog {
        &self.log
    }

    fn can_add(&self, alignment: &Alignment) -> Result<bool> {
        Ok((!self.checks_left() || !self.left.contains_key(alignment.entity1()))
            && (!self.checks_right() || !self.right.contains_key(alignment.entity2())))
    }

    fn add(&self, alignment: Arc<Alignment>) -> Result<Self> {
        if !self.can_add(&alignment)? {
            return Err(infeasible(&alignment));
        }
        let left = if self.checks_left() {
            self.left.insert(alignment.entity1().clone(), ())
        } else {
            self.left.clone()
        };
        let right = if self.checks_right() {
            self.right.insert(alignment.entity2().clone(), ())
        } else {
            self.right.clone()
        };
        Ok(Self {
            surjection: self.surjection,
            left,
            right,
            log: self.log.push(alignment),
        })
    }

    fn is_one_to_one(&self) -> bool {
        self.surjection == Surjection::Bijective
    }
}
