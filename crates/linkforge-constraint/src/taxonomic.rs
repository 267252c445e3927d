//! Taxonomic constraint - SKOS-typed linking.

use std::sync::Arc;

use linkforge_config::TaxonomicConfig;
use linkforge_core::{Alignment, EntityRef, LinkForgeError, Result};

use crate::branch::{BranchIndex, CommitLog};
use crate::constraint::{infeasible, Constraint};

/// The four modelled relation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationKind {
    Exact,
    Broad,
    Narrow,
    Related,
}

impl RelationKind {
    fn bit(self) -> u8 {
        match self {
            RelationKind::Exact => 1,
            RelationKind::Broad => 1 << 1,
            RelationKind::Narrow => 1 << 2,
            RelationKind::Related => 1 << 3,
        }
    }
}

/// Set of relation kinds an entity already takes part in.
type KindMask = u8;

/// SKOS-typed linking over per-entity relation sets.
///
/// | Relation | Left entity | Right entity |
/// |---|---|---|
/// | exact | unused | unused |
/// | broad | unused | unused, or only broad |
/// | narrow | unused, or only narrow | unused |
/// | related | unused, or only related | unused, or only related |
///
/// Any other relation is rejected with
/// [`LinkForgeError::UnsupportedRelation`].
#[derive(Clone, Debug)]
pub struct TaxonomicConstraint {
    relations: Arc<TaxonomicConfig>,
    left: BranchIndex<EntityRef, KindMask>,
    right: BranchIndex<EntityRef, KindMask>,
    log: CommitLog,
}

impl TaxonomicConstraint {
    /// Creates an empty state using the given relation URIs.
    pub fn new(relations: TaxonomicConfig) -> Self {
        Self {
            relations: Arc::new(relations),
            left: BranchIndex::new(),
            right: BranchIndex::new(),
            log: CommitLog::new(),
        }
    }

    /// Classifies a relation URI.
    pub fn kind(&self, relation: &str) -> Result<RelationKind> {
        let r = &self.relations;
        if relation == r.exact_match {
            Ok(RelationKind::Exact)
        } else if relation == r.broad_match {
            Ok(RelationKind::Broad)
        } else if relation == r.narrow_match {
            Ok(RelationKind::Narrow)
        } else if relation == r.related_match {
            Ok(RelationKind::Related)
        } else {
            Err(LinkForgeError::unsupported_relation(relation))
        }
    }
}

impl Default for TaxonomicConstraint {
    fn default() -> Self {
        Self::new(TaxonomicConfig::default())
    }
}

fn unused_or_only(mask: Option<&KindMask>, kind: RelationKind) -> bool {
    mask.map_or(true, |&m| m == kind.bit())
}

impl Constraint for TaxonomicConstraint {
    fn name(&self) -> &'static str {
        "taxonomic"
    }

    fn commits(&self) -> &CommitLog {
        &self.log
    }

    fn can_add(&self, alignment: &Alignment) -> Result<bool> {
        let kind = self.kind(alignment.relation())?;
        let left = self.left.get(alignment.entity1());
        let right = self.right.get(alignment.entity2());
        Ok(match kind {
            RelationKind::Exact => left.is_none() && right.is_none(),
            RelationKind::Broad => left.is_none() && unused_or_only(right, kind),
            RelationKind::Narrow => right.is_none() && unused_or_only(left, kind),
            RelationKind::Related => unused_or_only(left, kind) && unused_or_only(right, kind),
        })
    }

    fn add(&self, alignment: Arc<Alignment>) -> Result<Self> {
        if !self.can_add(&alignment)? {
            return Err(infeasible(&alignment));
        }
        let bit = self.kind(alignment.relation())?.bit();
        let left_mask = self.left.get(alignment.entity1()).copied().unwrap_or(0) | bit;
        let right_mask = self.right.get(alignment.entity2()).copied().unwrap_or(0) | bit;
        Ok(Self {
            relations: Arc::clone(&self.relations),
            left: self.left.insert(alignment.entity1().clone(), left_mask),
            right: self.right.insert(alignment.entity2().clone(), right_mask),
            log: self.log.push(alignment),
        })
    }
}
