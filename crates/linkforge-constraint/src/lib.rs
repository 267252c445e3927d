//! Branchable feasibility constraints for LinkForge.
//!
//! This crate provides:
//! - The [`Constraint`] trait: a running score plus a feasibility predicate,
//!   extended only through immutable `add`
//! - The shipped policies: [`ThresholdConstraint`], [`BijectiveConstraint`]
//!   (with surjective relaxations) and [`TaxonomicConstraint`]
//! - [`AnyConstraint`] and the name-keyed [`ConstraintFactory`]
//! - Persistent state ([`BranchIndex`], [`CommitLog`]) that lets sibling
//!   search branches share their ancestor's data

pub mod bijective;
pub mod branch;
pub mod constraint;
pub mod factory;
pub mod taxonomic;
pub mod threshold;

pub use bijective::BijectiveConstraint;
pub use branch::{BranchIndex, CommitLog};
pub use constraint::{infeasible, Constraint};
pub use factory::{AnyConstraint, ConstraintFactory};
pub use linkforge_config::Surjection;
pub use taxonomic::{RelationKind, TaxonomicConstraint};
pub use threshold::ThresholdConstraint;

#[cfg(test)]
mod tests;
