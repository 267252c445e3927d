//! Bounded priority frontier for beam search.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use linkforge_core::AlignmentScore;

type Key = (AlignmentScore, Reverse<u64>);

/// A score-ordered multiset of items, optionally capped at a maximum size.
///
/// "Best" means highest score; among equal scores the item inserted first
/// ranks better. Iteration runs from worst to best (non-decreasing scores).
/// When capped, adding to a full frontier evicts the worst item.
///
/// # Example
///
/// ```
/// use linkforge_core::AlignmentScore;
/// use linkforge_solver::BoundedFrontier;
///
/// let mut frontier = BoundedFrontier::bounded(2);
/// frontier.add("low", AlignmentScore::of(0.1));
/// frontier.add("high", AlignmentScore::of(0.9));
/// frontier.add("mid", AlignmentScore::of(0.5));
///
/// assert_eq!(frontier.len(), 2);
/// assert_eq!(frontier.peek().map(|(item, _)| *item), Some("high"));
/// assert_eq!(frontier.poll().map(|(item, _)| item), Some("high"));
/// assert_eq!(frontier.poll().map(|(item, _)| item), Some("mid"));
/// assert!(frontier.is_empty());
/// ```
pub struct BoundedFrontier<T> {
    items: BTreeMap<Key, T>,
    capacity: Option<usize>,
    next_seq: u64,
}

impl<T> BoundedFrontier<T> {
    /// Creates a frontier without a size cap.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Creates a frontier holding at most `capacity` items.
    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    /// Creates a frontier with an optional size cap.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            items: BTreeMap::new(),
            capacity,
            next_seq: 0,
        }
    }

    /// Adds an item with its score, evicting the worst item if the frontier
    /// is over capacity afterwards.
    pub fn add(&mut self, item: T, score: AlignmentScore) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.items.insert((score, Reverse(seq)), item);
        if let Some(capacity) = self.capacity {
            while self.items.len() > capacity {
                self.items.pop_first();
            }
        }
    }

    /// Returns the best item and its score.
    pub fn peek(&self) -> Option<(&T, AlignmentScore)> {
        self.items.last_key_value().map(|((score, _), item)| (item, *score))
    }

    /// Removes and returns the best item and its score.
    pub fn poll(&mut self) -> Option<(T, AlignmentScore)> {
        self.items.pop_last().map(|((score, _), item)| (item, score))
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the frontier holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the size cap, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Returns a frontier holding only the best `k` items. Ties keep their
    /// insertion order; the cap of the result is `k`.
    pub fn trim(mut self, k: usize) -> Self {
        if self.items.len() > k {
            let drop = self.items.len() - k;
            let split = self.items.keys().nth(drop).copied();
            self.items = match split {
                Some(key) => self.items.split_off(&key),
                None => BTreeMap::new(),
            };
        }
        self.capacity = Some(k);
        self
    }

    /// Iterates from worst to best. Use `.rev()` for best-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&T, AlignmentScore)> + '_ {
        self.items.iter().map(|((score, _), item)| (item, *score))
    }

    /// Consumes the frontier, yielding items best first.
    pub fn into_best_first(self) -> impl Iterator<Item = (T, AlignmentScore)> {
        self.items
            .into_iter()
            .rev()
            .map(|((score, _), item)| (item, score))
    }
}

impl<T> Default for BoundedFrontier<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> fmt::Debug for BoundedFrontier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedFrontier")
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .field("best", &self.peek().map(|(_, score)| score))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: f64) -> AlignmentScore {
        AlignmentScore::of(v)
    }

    #[test]
    fn test_iteration_is_non_decreasing() {
        let mut frontier = BoundedFrontier::unbounded();
        for (i, v) in [0.3, 0.1, 0.9, 0.5, 0.5, 0.0].into_iter().enumerate() {
            frontier.add(i, s(v));
        }
        let scores: Vec<f64> = frontier.iter().map(|(_, score)| score.value()).collect();
        assert_eq!(scores, vec![0.0, 0.1, 0.3, 0.5, 0.5, 0.9]);
    }

    #[test]
    fn test_ties_prefer_earlier_insertion() {
        let mut frontier = BoundedFrontier::unbounded();
        frontier.add("first", s(0.5));
        frontier.add("second", s(0.5));
        frontier.add("third", s(0.5));

        let best_first: Vec<&str> = frontier.iter().rev().map(|(item, _)| *item).collect();
        assert_eq!(best_first, vec!["first", "second", "third"]);

        let trimmed = frontier.trim(2);
        let kept: Vec<&str> = trimmed.iter().rev().map(|(item, _)| *item).collect();
        assert_eq!(kept, vec!["first", "second"]);
    }

    #[test]
    fn test_bounded_evicts_worst() {
        let mut frontier = BoundedFrontier::bounded(3);
        for (i, v) in [0.4, 0.2, 0.8, 0.6, 0.1].into_iter().enumerate() {
            frontier.add(i, s(v));
        }
        assert_eq!(frontier.len(), 3);
        let kept: Vec<usize> = frontier.iter().map(|(item, _)| *item).collect();
        assert_eq!(kept, vec![0, 3, 2]);
    }

    #[test]
    fn test_trim_after_bulk_add() {
        let mut frontier = BoundedFrontier::unbounded();
        for i in 0..1000 {
            frontier.add(i, s((i % 97) as f64));
        }
        let trimmed = frontier.trim(10);
        assert_eq!(trimmed.len(), 10);
        assert_eq!(trimmed.capacity(), Some(10));
        assert!(trimmed.iter().all(|(_, score)| score.value() >= 95.0));
        assert_eq!(trimmed.peek().map(|(_, score)| score.value()), Some(96.0));
    }

    #[test]
    fn test_trim_larger_than_len_keeps_all() {
        let mut frontier = BoundedFrontier::unbounded();
        frontier.add('a', s(1.0));
        let trimmed = frontier.trim(5);
        assert_eq!(trimmed.len(), 1);
        assert_eq!(BoundedFrontier::<u8>::unbounded().trim(0).len(), 0);
    }

    #[test]
    fn test_poll_drains_best_first() {
        let mut frontier = BoundedFrontier::unbounded();
        frontier.add(1, s(0.2));
        frontier.add(2, s(0.7));
        let drained: Vec<i32> = std::iter::from_fn(|| frontier.poll().map(|(i, _)| i)).collect();
        assert_eq!(drained, vec![2, 1]);
    }
}
