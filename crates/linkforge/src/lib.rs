//! LinkForge - constrained entity linking in Rust
//!
//! Pick a subset of scored candidate alignments between two datasets that a
//! constraint policy (one-to-one, taxonomic typing, plain threshold) allows,
//! maximizing the total score.
//!
//! # Example
//!
//! ```rust
//! use linkforge::prelude::*;
//!
//! let e = |s: &str| EntityRef::new(s, "d");
//! let candidates: AlignmentSet = vec![
//!     Alignment::new(e("a"), e("x"), 0.5),
//!     Alignment::new(e("a"), e("y"), 0.9),
//!     Alignment::new(e("b"), e("y"), 0.7),
//! ]
//! .into();
//!
//! // The default configuration runs unique assignment under a bijective policy.
//! let result = linkforge::align(&LinkConfig::default(), &candidates).unwrap();
//! assert_eq!(result.len(), 2);
//! ```

// Value types
pub use linkforge_core::{
    delta, Alignment, AlignmentScore, AlignmentSet, EntityRef, LinkForgeError, Result, EPS,
    SKOS_BROAD_MATCH, SKOS_EXACT_MATCH, SKOS_NARROW_MATCH, SKOS_RELATED_MATCH,
};

// Configuration
pub use linkforge_config::{
    BeamSearchConfig, BijectiveConfig, ConfigError, ConstraintConfig, LinkConfig, MatcherConfig,
    MonteCarloConfig, Params, Surjection, TaxonomicConfig, ThresholdConstraintConfig,
    ThresholdMatcherConfig, UniqueConfig,
};

// Constraint policies
pub use linkforge_constraint::{
    AnyConstraint, BijectiveConstraint, Constraint, ConstraintFactory, TaxonomicConstraint,
    ThresholdConstraint,
};

// Matchers and listeners
pub use linkforge_solver::{
    AnyMatcher, BeamSearch, BoundedFrontier, CountingListener, Level, ListenerSet,
    LoggingListener, MatchListener, Matcher, MatcherBuilder, MonteCarloTreeSearch, NoOpListener,
    Stage, ThresholdMatcher, UniqueAssignment,
};

#[cfg(feature = "console")]
pub mod console;

mod run;
pub use run::{align, align_with};

pub mod prelude {
    pub use super::{align, align_with};
    pub use super::{Alignment, AlignmentScore, AlignmentSet, EntityRef};
    pub use super::{Constraint, ConstraintConfig, LinkConfig, MatcherConfig};
    pub use super::{MatchListener, Matcher, NoOpListener};
}
