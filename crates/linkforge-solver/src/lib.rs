//! LinkForge Solver - matcher strategies
//!
//! This crate provides the matcher implementations including:
//! - The [`Matcher`] contract (`align` / `align_with`)
//! - Threshold filtering and unique assignment
//! - Beam search over a [`BoundedFrontier`]
//! - Monte Carlo tree search
//! - Exact one-to-one assignment (Hungarian method)
//! - Listeners for progress and diagnostics
//! - Configuration wiring (builder module)

pub mod assignment;
pub mod builder;
pub mod frontier;
pub mod listener;
pub mod matcher;

pub use builder::{AnyMatcher, MatcherBuilder};
pub use frontier::BoundedFrontier;
pub use listener::{
    CountingListener, Level, ListenerSet, LoggingListener, MatchListener, NoOpListener, Stage,
};
pub use matcher::{BeamSearch, Matcher, MonteCarloTreeSearch, ThresholdMatcher, UniqueAssignment};
