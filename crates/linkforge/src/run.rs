//! Config-driven entry points that hide the matcher wiring.

use linkforge_config::LinkConfig;
use linkforge_core::{AlignmentSet, Result};
use linkforge_solver::{MatchListener, Matcher, MatcherBuilder, NoOpListener};
use tracing::debug;

/// Aligns `candidates` with the matcher `config` selects.
///
/// # Errors
///
/// Returns [`linkforge_core::LinkForgeError::Config`] for an invalid
/// configuration, or whatever the matcher reports.
pub fn align(config: &LinkConfig, candidates: &AlignmentSet) -> Result<AlignmentSet> {
    align_with(config, candidates, &AlignmentSet::new(), &NoOpListener)
}

/// Aligns `candidates` on top of the `committed` alignments, reporting
/// progress to `listener`.
///
/// The result always contains every committed alignment.
pub fn align_with(
    config: &LinkConfig,
    candidates: &AlignmentSet,
    committed: &AlignmentSet,
    listener: &dyn MatchListener,
) -> Result<AlignmentSet> {
    #[cfg(feature = "console")]
    crate::console::init();

    let matcher = MatcherBuilder::build(&config.matcher, config.random_seed)?;
    debug!(
        event = "matcher_built",
        matcher = matcher.id(),
        constraint = config.matcher.constraint().map(|c| c.name()),
    );
    matcher.align_with(candidates, committed, listener)
}
