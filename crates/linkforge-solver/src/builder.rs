//! Builder module for constructing matchers from configuration
//!
//! This module provides the wiring between configuration types and the
//! matcher strategies, keyed by the configuration's `name`.

use linkforge_config::{MatcherConfig, Params};
use linkforge_core::{AlignmentSet, LinkForgeError, Result};

use crate::listener::MatchListener;
use crate::matcher::{
    BeamSearch, Matcher, MonteCarloTreeSearch, ThresholdMatcher, UniqueAssignment,
};

/// Every shipped matcher strategy, as a closed sum type.
#[derive(Debug, Clone)]
pub enum AnyMatcher {
    Threshold(ThresholdMatcher),
    Unique(UniqueAssignment),
    Greedy(UniqueAssignment),
    BeamSearch(BeamSearch),
    MonteCarlo(MonteCarloTreeSearch),
}

impl Matcher for AnyMatcher {
    fn id(&self) -> &'static str {
        match self {
            AnyMatcher::Threshold(m) => m.id(),
            AnyMatcher::Unique(m) | AnyMatcher::Greedy(m) => m.id(),
            AnyMatcher::BeamSearch(m) => m.id(),
            AnyMatcher::MonteCarlo(m) => m.id(),
        }
    }

    fn align_with(
        &self,
        candidates: &AlignmentSet,
        committed: &AlignmentSet,
        listener: &dyn MatchListener,
    ) -> Result<AlignmentSet> {
        match self {
            AnyMatcher::Threshold(m) => m.align_with(candidates, committed, listener),
            AnyMatcher::Unique(m) | AnyMatcher::Greedy(m) => {
                m.align_with(candidates, committed, listener)
            }
            AnyMatcher::BeamSearch(m) => m.align_with(candidates, committed, listener),
            AnyMatcher::MonteCarlo(m) => m.align_with(candidates, committed, listener),
        }
    }
}

/// Builder for constructing matchers from configuration.
pub struct MatcherBuilder;

impl MatcherBuilder {
    /// Registry names of the shipped strategies.
    pub const NAMES: [&'static str; 5] =
        ["threshold", "unique", "greedy", "beam-search", "monte-carlo"];

    /// Builds a matcher from configuration.
    ///
    /// `random_seed` seeds Monte Carlo tree search when its own
    /// configuration carries no seed.
    pub fn build(config: &MatcherConfig, random_seed: Option<u64>) -> Result<AnyMatcher> {
        config
            .validate()
            .map_err(|e| LinkForgeError::Config(e.to_string()))?;

        Ok(match config {
            MatcherConfig::Threshold(c) => AnyMatcher::Threshold(ThresholdMatcher::from_config(c)),
            MatcherConfig::Unique(c) => AnyMatcher::Unique(UniqueAssignment::from_config(c)),
            MatcherConfig::Greedy(c) => {
                AnyMatcher::Greedy(UniqueAssignment::from_config(c).with_exact(false))
            }
            MatcherConfig::BeamSearch(c) => AnyMatcher::BeamSearch(BeamSearch::from_config(c)),
            MatcherConfig::MonteCarlo(c) => {
                let mut matcher = MonteCarloTreeSearch::from_config(c);
                if let (None, Some(seed)) = (c.seed, random_seed) {
                    matcher = matcher.with_seed(seed);
                }
                AnyMatcher::MonteCarlo(matcher)
            }
        })
    }

    /// Builds a matcher from a flat key-value map carrying a `name` entry.
    pub fn from_params(params: &Params) -> Result<AnyMatcher> {
        let config =
            MatcherConfig::from_params(params).map_err(|e| LinkForgeError::Config(e.to_string()))?;
        Self::build(&config, None)
    }
}
