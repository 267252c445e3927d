//! Entity and alignment builders.
//!
//! # Example
//!
//! ```
//! use linkforge_test::entity::{link, res};
//!
//! let a = link("id1", "id2", 0.9);
//! assert_eq!(a.entity1(), &res("id1"));
//! assert_eq!(a.entity1().uri(), "file:test#id1");
//! ```

use linkforge_core::{Alignment, EntityRef};

/// URI prefix of every fixture entity.
pub const PREFIX: &str = "file:test#";

/// Dataset of every fixture entity.
pub const DATASET: &str = "dataset";

/// Creates the fixture entity `file:test#<name>`.
pub fn res(name: &str) -> EntityRef {
    EntityRef::new(format!("{}{}", PREFIX, name), DATASET)
}

/// Creates an exact-match alignment between two fixture entities.
pub fn link(left: &str, right: &str, probability: f64) -> Alignment {
    Alignment::new(res(left), res(right), probability)
}

/// Creates an alignment with an explicit relation between two fixture
/// entities.
pub fn typed_link(left: &str, right: &str, probability: f64, relation: &str) -> Alignment {
    Alignment::with_relation(res(left), res(right), probability, relation)
}

/// Strips [`PREFIX`] from a fixture entity URI.
pub fn local_name(entity: &EntityRef) -> &str {
    entity.uri().strip_prefix(PREFIX).unwrap_or(entity.uri())
}
