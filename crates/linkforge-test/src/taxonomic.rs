//! SKOS-typed fixtures.
//!
//! Entities live in dataset `ds` with `file:uriN` URIs.

use linkforge_core::{
    Alignment, EntityRef, SKOS_BROAD_MATCH, SKOS_EXACT_MATCH, SKOS_NARROW_MATCH,
    SKOS_RELATED_MATCH,
};

fn uri(name: &str) -> EntityRef {
    EntityRef::new(format!("file:{}", name), "ds")
}

fn typed(left: &str, right: &str, relation: &str) -> Alignment {
    Alignment::with_relation(uri(left), uri(right), 0.5, relation)
}

/// Alignments that are jointly feasible when added in order.
pub fn valid_sequence() -> Vec<Alignment> {
    vec![
        typed("uri1", "uri1", SKOS_EXACT_MATCH),
        typed("uri2a", "uri2", SKOS_BROAD_MATCH),
        typed("uri2b", "uri2", SKOS_BROAD_MATCH),
        typed("uri3", "uri3a", SKOS_NARROW_MATCH),
        typed("uri3", "uri3b", SKOS_NARROW_MATCH),
        typed("uri4", "uri4", SKOS_RELATED_MATCH),
        typed("uri5", "uri5", SKOS_RELATED_MATCH),
        typed("uri4", "uri5", SKOS_RELATED_MATCH),
    ]
}

/// Alignments each infeasible after [`valid_sequence`] has been added.
pub fn invalid_after_valid() -> Vec<Alignment> {
    vec![
        typed("uri1", "uri2", SKOS_EXACT_MATCH),
        typed("uri2a", "uri3", SKOS_BROAD_MATCH),
        typed("uri1", "uri4", SKOS_RELATED_MATCH),
    ]
}

/// An alignment whose relation no taxonomic policy models.
pub fn unsupported() -> Alignment {
    typed("uri9", "uri9", "http://www.w3.org/2002/07/owl#sameAs")
}
