//! Tests for the constraint policies.

use std::sync::Arc;

use linkforge_config::{
    BijectiveConfig, ConstraintConfig, TaxonomicConfig, ThresholdConstraintConfig,
};
use linkforge_core::{
    delta, Alignment, AlignmentScore, LinkForgeError, SKOS_BROAD_MATCH, SKOS_EXACT_MATCH,
    SKOS_RELATED_MATCH,
};
use linkforge_test::entity::{link, typed_link};
use linkforge_test::{five_alignments, taxonomic};

use super::*;

fn add<C: Constraint>(state: &C, alignment: Alignment) -> C {
    state.add(Arc::new(alignment)).unwrap()
}

// ============================================================================
// Bijective
// ============================================================================

#[test]
fn test_bijective_strict() {
    let state = add(&BijectiveConstraint::default(), link("a", "b", 1.0));
    assert!(!state.can_add(&link("a", "c", 1.0)).unwrap());
    assert!(!state.can_add(&link("c", "b", 1.0)).unwrap());
    assert!(state.can_add(&link("c", "d", 1.0)).unwrap());
    assert!(state.is_one_to_one());
}

#[test]
fn test_bijective_surjective() {
    let state = add(
        &BijectiveConstraint::new(Surjection::Surjective),
        link("a", "b", 1.0),
    );
    assert!(!state.can_add(&link("a", "c", 1.0)).unwrap());
    assert!(state.can_add(&link("c", "b", 1.0)).unwrap());
    assert!(!state.is_one_to_one());
}

#[test]
fn test_bijective_inverse_surjective() {
    let state = add(
        &BijectiveConstraint::new(Surjection::InverseSurjective),
        link("a", "b", 1.0),
    );
    assert!(state.can_add(&link("a", "c", 1.0)).unwrap());
    assert!(!state.can_add(&link("c", "b", 1.0)).unwrap());
}

#[test]
fn test_bijective_ignores_relation() {
    let state = add(&BijectiveConstraint::default(), link("a", "b", 0.5));
    assert!(!state
        .can_add(&typed_link("a", "b", 0.5, "http://example.org/anything"))
        .unwrap());
}

#[test]
fn test_add_infeasible_is_an_error() {
    let state = add(&BijectiveConstraint::default(), link("a", "b", 1.0));
    let err = state.add(Arc::new(link("a", "c", 1.0))).unwrap_err();
    assert!(matches!(err, LinkForgeError::InfeasibleAlignment { .. }));
    assert_eq!(state.len(), 1);
}

#[test]
fn test_siblings_share_ancestor_without_interference() {
    let root = add(&BijectiveConstraint::default(), link("a", "a", 0.5));
    let left = add(&root, link("b", "b", 0.5));
    let right = add(&root, link("b", "c", 0.5));

    assert!(left.can_add(&link("c", "c", 0.5)).unwrap());
    assert!(!right.can_add(&link("c", "c", 0.5)).unwrap());
    assert!(root.can_add(&link("b", "b", 0.5)).unwrap());
    assert_eq!(root.len(), 1);
    assert_eq!(left.len(), 2);
}

#[test]
fn test_deep_branch_survives_compaction() {
    let mut state = BijectiveConstraint::default();
    for i in 0..100 {
        state = add(&state, link(&format!("l{}", i), &format!("r{}", i), 0.5));
    }
    for i in 0..100 {
        assert!(!state
            .can_add(&link(&format!("l{}", i), "fresh", 0.5))
            .unwrap());
    }
    assert!(state.can_add(&link("l100", "r100", 0.5)).unwrap());
    assert_eq!(state.alignments().len(), 100);
}

// ============================================================================
// Taxonomic
// ============================================================================

#[test]
fn test_taxonomic_valids_and_invalids() {
    let mut state = TaxonomicConstraint::default();
    for a in taxonomic::valid_sequence() {
        assert!(state.can_add(&a).unwrap(), "rejected {:?}", a);
        state = add(&state, a);
    }
    for a in taxonomic::invalid_after_valid() {
        assert!(!state.can_add(&a).unwrap(), "accepted {:?}", a);
    }
}

#[test]
fn test_taxonomic_exact_then_broad_rejected() {
    let state = add(
        &TaxonomicConstraint::default(),
        typed_link("a", "b", 0.9, SKOS_EXACT_MATCH),
    );
    assert!(!state
        .can_add(&typed_link("a", "b", 0.9, SKOS_BROAD_MATCH))
        .unwrap());
    assert!(!state
        .can_add(&typed_link("c", "b", 0.9, SKOS_BROAD_MATCH))
        .unwrap());
}

#[test]
fn test_taxonomic_related_needs_consistent_slots() {
    let state = add(
        &TaxonomicConstraint::default(),
        typed_link("a", "a", 0.9, SKOS_EXACT_MATCH),
    );
    // Entities typed exact elsewhere cannot take a related link...
    assert!(!state
        .can_add(&typed_link("a", "x", 0.4, SKOS_RELATED_MATCH))
        .unwrap());
    assert!(!state
        .can_add(&typed_link("x", "a", 0.4, SKOS_RELATED_MATCH))
        .unwrap());
    // ...but fresh entities can, repeatedly.
    let state = add(&state, typed_link("b", "c", 0.4, SKOS_RELATED_MATCH));
    assert!(state
        .can_add(&typed_link("b", "d", 0.4, SKOS_RELATED_MATCH))
        .unwrap());
}

#[test]
fn test_taxonomic_unsupported_relation() {
    let state = TaxonomicConstraint::default();
    let err = state.can_add(&taxonomic::unsupported()).unwrap_err();
    assert!(matches!(err, LinkForgeError::UnsupportedRelation { .. }));
    assert!(state.add(Arc::new(taxonomic::unsupported())).is_err());
}

#[test]
fn test_taxonomic_custom_relations() {
    let relations = TaxonomicConfig {
        exact_match: "http://example.org/same".into(),
        ..TaxonomicConfig::default()
    };
    let state = TaxonomicConstraint::new(relations);
    assert!(state
        .can_add(&typed_link("a", "b", 0.5, "http://example.org/same"))
        .unwrap());
    assert!(state
        .can_add(&typed_link("a", "b", 0.5, SKOS_EXACT_MATCH))
        .is_err());
}

// ============================================================================
// Threshold
// ============================================================================

#[test]
fn test_threshold() {
    let state = ThresholdConstraint::new(0.5);
    assert!(state.can_add(&link("a", "b", 0.5)).unwrap());
    assert!(!state.can_add(&link("a", "b", 0.49)).unwrap());

    // No interaction between alignments.
    let state = add(&state, link("a", "b", 0.9));
    assert!(state.can_add(&link("a", "b", 0.6)).unwrap());
}

// ============================================================================
// Score and factory
// ============================================================================

#[test]
fn test_score_increases_by_delta() {
    let mut state: AnyConstraint = BijectiveConstraint::default().into();
    let mut expected = AlignmentScore::ZERO;
    for a in five_alignments() {
        if state.can_add(&a).unwrap() {
            let before = state.score();
            expected = expected.add_probability(a.probability());
            state = add(&state, a.clone());
            assert!(state.score() > before);
            assert!(((state.score() - before).value() - delta(a.probability())).abs() < 1e-12);
        }
    }
    assert_eq!(state.score(), expected);
}

#[test]
fn test_factory_builds_each_policy() {
    let configs = [
        ConstraintConfig::Threshold(ThresholdConstraintConfig { threshold: 0.3 }),
        ConstraintConfig::Bijective(BijectiveConfig::default()),
        ConstraintConfig::Taxonomic(TaxonomicConfig::default()),
    ];
    for (config, name) in configs.into_iter().zip(ConstraintFactory::NAMES) {
        let empty = ConstraintFactory::new(config).make();
        assert_eq!(empty.name(), name);
        assert!(empty.is_empty());
        assert!(empty.is_complete());
        assert_eq!(empty.score(), AlignmentScore::ZERO);
    }
}

#[test]
fn test_factory_from_params_errors() {
    let mut params = linkforge_config::Params::new();
    params.insert("name".into(), "edge-correctness".into());
    assert!(matches!(
        ConstraintFactory::from_params(&params),
        Err(LinkForgeError::Config(_))
    ));
}

#[test]
fn test_any_constraint_add_keeps_variant() {
    let empty = ConstraintFactory::default().make();
    let state = add(&empty, link("a", "b", 0.5));
    assert!(matches!(state, AnyConstraint::Bijective(_)));
    assert!(state.is_one_to_one());
    assert_eq!(state.alignment_set().len(), 1);
}
