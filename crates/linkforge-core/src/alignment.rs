//! Scored correspondences between two entities.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entity::EntityRef;
use crate::relation::SKOS_EXACT_MATCH;

/// A scored, typed correspondence between an entity of the left dataset and
/// an entity of the right dataset.
///
/// Alignments are immutable values. Equality (and hashing) uses the two
/// entities, the probability and the relation; evidence is ignored.
///
/// # Example
///
/// ```
/// use linkforge_core::{Alignment, EntityRef, SKOS_EXACT_MATCH};
///
/// let a = Alignment::new(
///     EntityRef::new("file:left#cat", "left"),
///     EntityRef::new("file:right#chat", "right"),
///     0.8,
/// );
///
/// assert_eq!(a.relation(), SKOS_EXACT_MATCH);
/// assert_eq!(a.probability(), 0.8);
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    entity1: EntityRef,
    entity2: EntityRef,
    probability: f64,
    relation: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    evidence: Option<Vec<String>>,
}

impl Alignment {
    /// Creates an `skos:exactMatch` alignment.
    pub fn new(entity1: EntityRef, entity2: EntityRef, probability: f64) -> Self {
        Self::with_relation(entity1, entity2, probability, SKOS_EXACT_MATCH)
    }

    /// Creates an alignment with an explicit relation URI.
    ///
    /// The probability is expected to lie in `[0, 1]`; this is checked in
    /// debug builds only, since upstream scorers guarantee it.
    pub fn with_relation(
        entity1: EntityRef,
        entity2: EntityRef,
        probability: f64,
        relation: impl Into<String>,
    ) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&probability),
            "alignment probability {} outside [0, 1]",
            probability
        );
        Self {
            entity1,
            entity2,
            probability,
            relation: relation.into(),
            evidence: None,
        }
    }

    /// Attaches opaque evidence (for example the feature values that
    /// produced the probability).
    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// Returns the left entity.
    #[inline]
    pub fn entity1(&self) -> &EntityRef {
        &self.entity1
    }

    /// Returns the right entity.
    #[inline]
    pub fn entity2(&self) -> &EntityRef {
        &self.entity2
    }

    /// Returns the probability of this alignment.
    #[inline]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Returns the relation URI.
    #[inline]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Returns the evidence, if any was attached.
    pub fn evidence(&self) -> Option<&[String]> {
        self.evidence.as_deref()
    }

    /// Returns true if this alignment links the same entity pair with the
    /// same relation as `other`, regardless of probability.
    pub fn same_link(&self, other: &Alignment) -> bool {
        self.entity1 == other.entity1
            && self.entity2 == other.entity2
            && self.relation == other.relation
    }

    /// The deterministic candidate order used by every matcher: probability
    /// descending, then left entity, right entity and relation ascending.
    pub fn rank_cmp(&self, other: &Alignment) -> Ordering {
        other
            .probability
            .total_cmp(&self.probability)
            .then_with(|| self.entity1.cmp(&other.entity1))
            .then_with(|| self.entity2.cmp(&other.entity2))
            .then_with(|| self.relation.cmp(&other.relation))
    }
}

impl PartialEq for Alignment {
    fn eq(&self, other: &Self) -> bool {
        self.same_link(other) && self.probability.to_bits() == other.probability.to_bits()
    }
}

impl Eq for Alignment {}

impl Hash for Alignment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity1.hash(state);
        self.entity2.hash(state);
        self.probability.to_bits().hash(state);
        self.relation.hash(state);
    }
}

impl fmt::Debug for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Alignment({:?} {} {:?}, {:.4})",
            self.entity1, self.relation, self.entity2, self.probability
        )
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {} . # {:.4}",
            self.entity1, self.relation, self.entity2, self.probability
        )
    }
}
