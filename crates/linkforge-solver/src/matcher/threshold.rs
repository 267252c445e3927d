//! Threshold matcher - keeps every candidate above a probability cut-off.

use linkforge_config::{ThresholdMatcherConfig, DEFAULT_MATCHER_THRESHOLD};
use linkforge_constraint::{Constraint, ThresholdConstraint};
use linkforge_core::{AlignmentSet, Result};
use tracing::info;

use super::{links_committed, Matcher};
use crate::listener::{MatchListener, Stage};

/// Keeps every candidate whose probability is at least `threshold`.
///
/// Candidates never interact, so the result does not depend on order and
/// re-running the matcher on its own output returns that output unchanged.
///
/// # Example
///
/// ```
/// use linkforge_core::{Alignment, AlignmentSet, EntityRef};
/// use linkforge_solver::{Matcher, ThresholdMatcher};
///
/// let e = |s: &str| EntityRef::new(s, "d");
/// let candidates: AlignmentSet = vec![
///     Alignment::new(e("a"), e("x"), 0.8),
///     Alignment::new(e("a"), e("y"), 0.3),
/// ]
/// .into();
///
/// let result = ThresholdMatcher::new(0.5).align(&candidates).unwrap();
/// assert_eq!(result.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ThresholdMatcher {
    threshold: f64,
}

impl ThresholdMatcher {
    /// Creates a matcher with the given cut-off.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Creates a matcher from its configuration.
    pub fn from_config(config: &ThresholdMatcherConfig) -> Self {
        Self::new(config.threshold)
    }

    /// Returns the cut-off.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ThresholdMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCHER_THRESHOLD)
    }
}

impl Matcher for ThresholdMatcher {
    fn id(&self) -> &'static str {
        "threshold"
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
            candidates = candidates.len(),
            committed = committed.len(),
        );

        let policy = ThresholdConstraint::new(self.threshold);
        let mut result = committed.clone();
        listener.on_stage(Stage::Matching);
        for alignment in candidates {
            if links_committed(committed, alignment) {
                continue;
            }
            if policy.can_add(alignment)? {
                result.add(alignment.clone());
            }
        }

        info!(
            event = "match_end",
            matcher = self.id(),
            alignments = result.len(),
        );
        listener.on_stage(Stage::Completed);
        Ok(result)
    }
}
