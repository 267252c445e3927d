//! Threshold constraint - each alignment judged on its own probability.

use std::sync::Arc;

use linkforge_core::{Alignment, Result};

use crate::branch::CommitLog;
use crate::constraint::{infeasible, Constraint};

/// Accepts every alignment whose probability is at least `threshold`.
///
/// Alignments never interact; the default threshold accepts everything.
///
/// # Example
///
/// ```
/// use linkforge_constraint::{Constraint, ThresholdConstraint};
/// use linkforge_core::{Alignment, EntityRef};
///
/// let c = ThresholdConstraint::new(0.5);
/// let a = Alignment::new(EntityRef::new("a", "l"), EntityRef::new("b", "r"), 0.4);
///
/// assert!(!c.can_add(&a).unwrap());
/// assert!(ThresholdConstraint::default().can_add(&a).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct ThresholdConstraint {
    threshold: f64,
    log: CommitLog,
}

impl ThresholdConstraint {
    /// Creates an empty state with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            log: CommitLog::new(),
        }
    }

    /// Returns the threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ThresholdConstraint {
    fn default() -> Self {
        Self::new(f64::NEG_INFINITY)
    }
}

impl Constraint for ThresholdConstraint {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn commits(&self) -> &CommitLog {
        &self.log
    }

    fn can_add(&self, alignment: &Alignment) -> Result<bool> {
        Ok(alignment.probability() >= self.threshold)
    }

    fn add(&self, alignment: Arc<Alignment>) -> Result<Self> {
        if !self.can_add(&alignment)? {
            return Err(infeasible(&alignment));
        }
        Ok(Self {
            threshold: self.threshold,
            log: self.log.push(alignment),
        })
    }
}
