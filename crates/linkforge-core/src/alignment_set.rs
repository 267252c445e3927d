//! Unordered collections of alignments.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::alignment::Alignment;
use crate::entity::EntityRef;

/// Positions of the alignments linking a left entity to a right entity,
/// oldest first.
type LinkIndex = HashMap<EntityRef, HashMap<EntityRef, Vec<usize>>>;

/// A collection of alignments with lookup by linked pair and relation.
///
/// Insertion order carries no meaning. A set is expected to hold at most one
/// alignment per `(entity1, entity2, relation)`; adding a second one for the
/// same link is a caller error, after which lookups return the latest.
///
/// # Example
///
/// ```
/// use linkforge_core::{Alignment, AlignmentSet, EntityRef};
///
/// let a = EntityRef::new("file:a", "left");
/// let b = EntityRef::new("file:b", "right");
///
/// let mut set = AlignmentSet::new();
/// set.add(Alignment::new(a.clone(), b.clone(), 0.7));
///
/// assert_eq!(set.len(), 1);
/// assert!(set.has_link(&a, &b));
/// assert!(set.contains(&Alignment::new(a, b, 0.7)));
/// ```
#[derive(Clone, Default)]
pub struct AlignmentSet {
    alignments: Vec<Alignment>,
    index: LinkIndex,
}

impl AlignmentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` alignments.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            alignments: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Adds an alignment.
    pub fn add(&mut self, alignment: Alignment) {
        let pos = self.alignments.len();
        self.index_at(&alignment).push(pos);
        self.alignments.push(alignment);
    }

    fn index_at(&mut self, alignment: &Alignment) -> &mut Vec<usize> {
        self.index
            .entry(alignment.entity1().clone())
            .or_default()
            .entry(alignment.entity2().clone())
            .or_default()
    }

    fn positions(&self, entity1: &EntityRef, entity2: &EntityRef) -> &[usize] {
        self.index
            .get(entity1)
            .and_then(|right| right.get(entity2))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Position of the latest alignment for the link, if any.
    fn position(
        &self,
        entity1: &EntityRef,
        entity2: &EntityRef,
        relation: &str,
    ) -> Option<usize> {
        self.positions(entity1, entity2)
            .iter()
            .rev()
            .copied()
            .find(|&pos| self.alignments[pos].relation() == relation)
    }

    fn unindex(&mut self, alignment: &Alignment, pos: usize) {
        let Some(right) = self.index.get_mut(alignment.entity1()) else {
            return;
        };
        if let Some(positions) = right.get_mut(alignment.entity2()) {
            positions.retain(|&p| p != pos);
            if positions.is_empty() {
                right.remove(alignment.entity2());
            }
        }
        if right.is_empty() {
            self.index.remove(alignment.entity1());
        }
    }

    fn rebuild_index(&mut self) {
        let mut index = LinkIndex::new();
        for (pos, alignment) in self.alignments.iter().enumerate() {
            index
                .entry(alignment.entity1().clone())
                .or_default()
                .entry(alignment.entity2().clone())
                .or_default()
                .push(pos);
        }
        self.index = index;
    }

    /// Adds every alignment of `other`.
    pub fn union(&mut self, other: &AlignmentSet) {
        self.extend(other.iter().cloned());
    }

    /// Removes an equal alignment, returning true if one was present.
    pub fn remove(&mut self, alignment: &Alignment) -> bool {
        let Some(pos) =
            self.position(alignment.entity1(), alignment.entity2(), alignment.relation())
        else {
            return false;
        };
        if self.alignments[pos] != *alignment {
            return false;
        }
        let last = self.alignments.len() - 1;
        let removed = self.alignments.swap_remove(pos);
        self.unindex(&removed, pos);
        if pos != last {
            let moved = self.alignments[pos].clone();
            for p in self.index_at(&moved).iter_mut() {
                if *p == last {
                    *p = pos;
                }
            }
        }
        true
    }

    /// Returns true if an equal alignment (same link, probability and
    /// relation) is in this set.
    pub fn contains(&self, alignment: &Alignment) -> bool {
        self.find(alignment.entity1(), alignment.entity2(), alignment.relation())
            .is_some_and(|found| found == alignment)
    }

    /// Finds the alignment linking `entity1` to `entity2` with `relation`.
    pub fn find(
        &self,
        entity1: &EntityRef,
        entity2: &EntityRef,
        relation: &str,
    ) -> Option<&Alignment> {
        self.position(entity1, entity2, relation)
            .map(|pos| &self.alignments[pos])
    }

    /// Returns true if some alignment links `entity1` to `entity2` with
    /// `relation`.
    pub fn contains_link(
        &self,
        entity1: &EntityRef,
        entity2: &EntityRef,
        relation: &str,
    ) -> bool {
        self.position(entity1, entity2, relation).is_some()
    }

    /// Returns true if any relation links `entity1` to `entity2`.
    pub fn has_link(&self, entity1: &EntityRef, entity2: &EntityRef) -> bool {
        !self.positions(entity1, entity2).is_empty()
    }

    /// Returns the relation of some alignment linking `entity1` to `entity2`.
    pub fn find_link(&self, entity1: &EntityRef, entity2: &EntityRef) -> Option<&str> {
        self.positions(entity1, entity2)
            .first()
            .map(|&pos| self.alignments[pos].relation())
    }

    /// Returns the distinct relations used in this set.
    pub fn relations(&self) -> BTreeSet<&str> {
        self.alignments.iter().map(Alignment::relation).collect()
    }

    /// Sorts the alignments into the deterministic matcher order
    /// (see [`Alignment::rank_cmp`]).
    pub fn sort_alignments(&mut self) {
        self.alignments.sort_by(Alignment::rank_cmp);
        self.rebuild_index();
    }

    /// Returns the alignments as a slice.
    pub fn as_slice(&self) -> &[Alignment] {
        &self.alignments
    }

    /// Returns the alignment at `index`.
    pub fn get(&self, index: usize) -> Option<&Alignment> {
        self.alignments.get(index)
    }

    /// Returns an iterator over the alignments.
    pub fn iter(&self) -> std::slice::Iter<'_, Alignment> {
        self.alignments.iter()
    }

    /// Returns the number of alignments.
    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    /// Returns true if both sets hold equal alignments, in any order.
    pub fn same_alignments(&self, other: &AlignmentSet) -> bool {
        self.len() == other.len() && self.iter().all(|a| other.contains(a))
    }
}

impl PartialEq for AlignmentSet {
    fn eq(&self, other: &Self) -> bool {
        self.same_alignments(other)
    }
}

impl fmt::Debug for AlignmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignmentSet")
            .field("alignments", &self.alignments)
            .finish()
    }
}

impl Extend<Alignment> for AlignmentSet {
    fn extend<I: IntoIterator<Item = Alignment>>(&mut self, iter: I) {
        for alignment in iter {
            self.add(alignment);
        }
    }
}

impl FromIterator<Alignment> for AlignmentSet {
    fn from_iter<I: IntoIterator<Item = Alignment>>(iter: I) -> Self {
        let mut set = AlignmentSet::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<Alignment>> for AlignmentSet {
    fn from(alignments: Vec<Alignment>) -> Self {
        alignments.into_iter().collect()
    }
}

impl IntoIterator for AlignmentSet {
    type Item = Alignment;
    type IntoIter = std::vec::IntoIter<Alignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.alignments.into_iter()
    }
}

impl<'a> IntoIterator for &'a AlignmentSet {
    type Item = &'a Alignment;
    type IntoIter = std::slice::Iter<'a, Alignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.alignments.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AlignmentSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.alignments.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AlignmentSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Alignment>::deserialize(deserializer).map(AlignmentSet::from)
    }
}

#[cfg(test)]
#[path = "alignment_set_tests.rs"]
mod tests;
