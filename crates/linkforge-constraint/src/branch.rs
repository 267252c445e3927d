//! Persistent state shared between branches of a search.
//!
//! Search strategies branch many children off one ancestor state. Both
//! structures here are immutable: an update returns a new value that shares
//! everything it did not touch with its parent.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use linkforge_core::{Alignment, AlignmentScore, AlignmentSet};

/// Layers kept on top of a base map before it is rebuilt.
const COMPACT_DEPTH: usize = 32;

struct Layer<K, V> {
    key: K,
    value: V,
    parent: Option<Arc<Layer<K, V>>>,
}

/// A persistent map: a shared base `HashMap` plus a short chain of
/// single-entry layers.
///
/// Lookups walk at most `COMPACT_DEPTH` layers before reaching the base.
/// Once the chain grows past that, the next insert folds it into a fresh
/// base, so the amortized cost of an insert stays O(n / COMPACT_DEPTH).
///
/// # Example
///
/// ```
/// use linkforge_constraint::BranchIndex;
///
/// let root: BranchIndex<&str, u8> = BranchIndex::new();
/// let left = root.insert("a", 1);
/// let right = root.insert("b", 2);
///
/// assert_eq!(left.get(&"a"), Some(&1));
/// assert_eq!(left.get(&"b"), None);
/// assert_eq!(right.get(&"b"), Some(&2));
/// assert!(root.get(&"a").is_none());
/// ```
pub struct BranchIndex<K, V> {
    base: Arc<HashMap<K, V>>,
    head: Option<Arc<Layer<K, V>>>,
    depth: usize,
}

impl<K, V> BranchIndex<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            base: Arc::new(HashMap::new()),
            head: None,
            depth: 0,
        }
    }

    /// Returns the value for `key`, newest layer first.
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut layer = self.head.as_deref();
        while let Some(l) = layer {
            if l.key == *key {
                return Some(&l.value);
            }
            layer = l.parent.as_deref();
        }
        self.base.get(key)
    }

    /// Returns true if `key` has a value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a new index with `key` set to `value`. `self` is unchanged.
    pub fn insert(&self, key: K, value: V) -> Self {
        let next = Self {
            base: Arc::clone(&self.base),
            head: Some(Arc::new(Layer {
                key,
                value,
                parent: self.head.clone(),
            })),
            depth: self.depth + 1,
        };
        if next.depth > COMPACT_DEPTH {
            next.compacted()
        } else {
            next
        }
    }

    /// Number of layers above the shared base.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn compacted(&self) -> Self {
        let mut layers = Vec::with_capacity(self.depth);
        let mut layer = self.head.as_deref();
        while let Some(l) = layer {
            layers.push(l);
            layer = l.parent.as_deref();
        }

        let mut map = HashMap::clone(&self.base);
        map.reserve(layers.len());
        for l in layers.into_iter().rev() {
            map.insert(l.key.clone(), l.value.clone());
        }
        Self {
            base: Arc::new(map),
            head: None,
            depth: 0,
        }
    }
}

impl<K, V> Clone for BranchIndex<K, V> {
    fn clone(&self) -> Self {
        Self {
            base: Arc::clone(&self.base),
            head: self.head.clone(),
            depth: self.depth,
        }
    }
}

impl<K, V> Default for BranchIndex<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for BranchIndex<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchIndex")
            .field("base_len", &self.base.len())
            .field("depth", &self.depth)
            .finish()
    }
}

struct Commit {
    alignment: Arc<Alignment>,
    parent: Option<Arc<Commit>>,
}

impl Drop for Commit {
    // Unlink iteratively: drop depth must not grow with the log length.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// The alignments committed into a constraint state, with their score.
///
/// A persistent cons-list: pushing shares the whole history with the parent
/// log. The score is the sum of [`linkforge_core::delta`] over the committed
/// alignments.
#[derive(Clone, Default)]
pub struct CommitLog {
    head: Option<Arc<Commit>>,
    len: usize,
    score: AlignmentScore,
}

impl CommitLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new log with `alignment` appended.
    pub fn push(&self, alignment: Arc<Alignment>) -> Self {
        let score = self.score.add_alignment(&alignment);
        Self {
            head: Some(Arc::new(Commit {
                alignment,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
            score,
        }
    }

    /// Number of committed alignments.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sum of the score deltas of the committed alignments.
    pub fn score(&self) -> AlignmentScore {
        self.score
    }

    /// Returns the most recently committed alignment.
    pub fn last(&self) -> Option<&Arc<Alignment>> {
        self.head.as_deref().map(|c| &c.alignment)
    }

    /// Returns the committed alignments, oldest first.
    pub fn to_vec(&self) -> Vec<Arc<Alignment>> {
        let mut out = Vec::with_capacity(self.len);
        let mut commit = self.head.as_deref();
        while let Some(c) = commit {
            out.push(Arc::clone(&c.alignment));
            commit = c.parent.as_deref();
        }
        out.reverse();
        out
    }

    /// Collects the committed alignments into a set.
    pub fn to_alignment_set(&self) -> AlignmentSet {
        self.to_vec().iter().map(|a| Alignment::clone(a)).collect()
    }
}

impl fmt::Debug for CommitLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitLog")
            .field("len", &self.len)
            .field("score", &self.score)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkforge_test::entity::link;

    #[test]
    fn test_branches_do_not_observe_each_other() {
        let root: BranchIndex<u32, &str> = BranchIndex::new();
        let a = root.insert(1, "a");
        let b = a.insert(2, "b");
        let c = a.insert(2, "c");

        assert_eq!(b.get(&2), Some(&"b"));
        assert_eq!(c.get(&2), Some(&"c"));
        assert_eq!(a.get(&2), None);
        assert_eq!(b.get(&1), Some(&"a"));
    }

    #[test]
    fn test_newest_layer_wins() {
        let index = BranchIndex::new().insert("k", 1).insert("k", 3);
        assert_eq!(index.get(&"k"), Some(&3));
    }

    #[test]
    fn test_compaction_preserves_contents() {
        let mut index: BranchIndex<usize, usize> = BranchIndex::new();
        let mut snapshots = Vec::new();
        for i in 0..100 {
            index = index.insert(i % 40, i);
            snapshots.push(index.clone());
        }
        assert!(index.depth() <= COMPACT_DEPTH);

        for i in 60..100 {
            assert_eq!(index.get(&(i % 40)), Some(&i));
        }
        // Older snapshots still see their own history.
        assert_eq!(snapshots[10].get(&10), Some(&10));
        assert_eq!(snapshots[10].get(&11), None);
    }

    #[test]
    fn test_commit_log_order_and_score() {
        let root = CommitLog::new();
        let one = root.push(Arc::new(link("a", "b", 0.5)));
        let two = one.push(Arc::new(link("c", "d", 0.9)));

        assert!(root.is_empty());
        assert_eq!(two.len(), 2);
        assert_eq!(two.to_vec()[0].entity1(), link("a", "b", 0.5).entity1());
        assert_eq!(two.last().map(|a| a.probability()), Some(0.9));
        assert!(two.score() > one.score());
        assert!(one.score() > root.score());
        assert_eq!(one.to_alignment_set().len(), 1);
    }

    #[test]
    fn test_long_log_drops() {
        let mut log = CommitLog::new();
        let a = Arc::new(link("a", "b", 0.1));
        for _ in 0..200_000 {
            log = log.push(Arc::clone(&a));
        }
        assert_eq!(log.len(), 200_000);
        drop(log);
    }
}
