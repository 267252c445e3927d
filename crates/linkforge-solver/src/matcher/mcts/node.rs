//! Search tree node for Monte Carlo tree search.
//!
//! Nodes live in an arena (`Vec<SearchNode<C>>`) and refer to each other by
//! index.

use std::sync::Arc;

use linkforge_constraint::Constraint;
use linkforge_core::{Alignment, Result};

/// A node in the search tree.
///
/// Each node holds:
/// - The constraint state reached by the path from the root
/// - The rank of the candidate added last on that path
/// - A cursor over the candidates ranked after it, checked lazily for the
///   next feasible extension
/// - Visit and reward statistics from rollouts through this node
#[derive(Debug, Clone)]
pub struct SearchNode<C> {
    /// Constraint state at this node.
    state: C,

    /// Parent node index in the arena (None for root).
    parent_index: Option<usize>,

    /// Rank of the candidate that led here (None for root).
    last: Option<usize>,

    /// Expanded children, as arena indices.
    children: Vec<usize>,

    /// Next candidate rank to check.
    cursor: usize,

    /// Lowest feasible rank not yet expanded.
    next: Option<usize>,

    visits: u64,
    reward: f64,

    /// True once every subtree below this node has been fully expanded.
    exhausted: bool,
}

impl<C: Constraint> SearchNode<C> {
    /// Creates a new root node.
    pub fn root(state: C, candidates: &[Arc<Alignment>]) -> Result<Self> {
        Self::new(state, None, None, candidates)
    }

    /// Creates a child node reached by adding the candidate ranked `last`.
    pub fn child(
        parent_index: usize,
        state: C,
        last: usize,
        candidates: &[Arc<Alignment>],
    ) -> Result<Self> {
        Self::new(state, Some(parent_index), Some(last), candidates)
    }

    fn new(
        state: C,
        parent_index: Option<usize>,
        last: Option<usize>,
        candidates: &[Arc<Alignment>],
    ) -> Result<Self> {
        let mut node = Self {
            state,
            parent_index,
            last,
            children: Vec::new(),
            cursor: last.map_or(0, |rank| rank + 1),
            next: None,
            visits: 0,
            reward: 0.0,
            exhausted: false,
        };
        node.advance(candidates)?;
        node.exhausted = node.next.is_none();
        Ok(node)
    }

    /// Moves the cursor to the next candidate the state accepts.
    fn advance(&mut self, candidates: &[Arc<Alignment>]) -> Result<()> {
        self.next = None;
        while let Some(candidate) = candidates.get(self.cursor) {
            let rank = self.cursor;
            self.cursor += 1;
            if self.state.can_add(candidate)? {
                self.next = Some(rank);
                break;
            }
        }
        Ok(())
    }

    /// Removes and returns the lowest untried rank.
    pub fn pop_untried(&mut self, candidates: &[Arc<Alignment>]) -> Result<Option<usize>> {
        let Some(rank) = self.next else {
            return Ok(None);
        };
        self.advance(candidates)?;
        Ok(Some(rank))
    }
}

impl<C> SearchNode<C> {
    /// Returns the constraint state.
    #[inline]
    pub fn state(&self) -> &C {
        &self.state
    }

    /// Returns the parent node index.
    #[inline]
    pub fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    /// Returns the rank of the candidate that led here.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// Returns the expanded children.
    #[inline]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Returns true if some extension has not been expanded yet.
    #[inline]
    pub fn has_untried(&self) -> bool {
        self.next.is_some()
    }

    /// Registers an expanded child.
    pub fn add_child(&mut self, index: usize) {
        self.children.push(index);
    }

    /// Returns the number of rollouts through this node.
    #[inline]
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Returns the mean rollout reward, or 0 before the first visit.
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / self.visits as f64
        }
    }

    /// Records one rollout through this node.
    pub fn record(&mut self, reward: f64) {
        self.visits += 1;
        self.reward += reward;
    }

    /// Returns true if nothing below this node is left to expand.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Marks this node as exhausted.
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }
}
