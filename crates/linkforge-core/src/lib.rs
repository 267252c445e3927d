//! LinkForge Core - Core types for constrained entity linking
//!
//! This crate provides the value types shared by every LinkForge crate:
//! - Entity references and scored alignments between two datasets
//! - Alignment sets with relation-aware lookup
//! - The additive alignment score used to rank partial solutions
//! - The common error type

pub mod alignment;
pub mod alignment_set;
pub mod entity;
pub mod error;
pub mod relation;
pub mod score;

pub use alignment::Alignment;
pub use alignment_set::AlignmentSet;
pub use entity::EntityRef;
pub use error::{LinkForgeError, Result};
pub use relation::{SKOS_BROAD_MATCH, SKOS_EXACT_MATCH, SKOS_NARROW_MATCH, SKOS_RELATED_MATCH};
pub use score::{delta, AlignmentScore, EPS};
