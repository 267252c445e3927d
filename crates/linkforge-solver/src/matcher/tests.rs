//! Tests for the matcher strategies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use linkforge_constraint::{
    AnyConstraint, BijectiveConstraint, CommitLog, Constraint, Surjection, TaxonomicConstraint,
    ThresholdConstraint,
};
use linkforge_core::{delta, Alignment, AlignmentSet, LinkForgeError, Result};
use linkforge_test::candidates::dense_grid;
use linkforge_test::taxonomic::{unsupported, valid_sequence};
use linkforge_test::{five_alignments, link, link_names};

use super::*;
use crate::listener::CountingListener;

fn names(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut v: Vec<(String, String)> = pairs
        .iter()
        .map(|(l, r)| (l.to_string(), r.to_string()))
        .collect();
    v.sort();
    v
}

fn score(set: &AlignmentSet) -> f64 {
    set.iter().map(|a| delta(a.probability())).sum()
}

/// Replays `set` into `empty` in rank order, failing on any conflict.
fn assert_feasible<C: Constraint>(empty: &C, set: &AlignmentSet) {
    let mut order: Vec<&Alignment> = set.iter().collect();
    order.sort_by(|a, b| a.rank_cmp(b));
    let mut state = empty.clone();
    for alignment in order {
        assert!(
            state.can_add(alignment).unwrap(),
            "{} conflicts with the rest of the result",
            alignment
        );
        state = state.add(Arc::new(alignment.clone())).unwrap();
    }
}

fn bijective() -> BijectiveConstraint {
    BijectiveConstraint::default()
}

/// Bijective policy that counts `can_add` calls and can refuse to call any
/// state complete.
#[derive(Debug, Clone)]
struct Instrumented {
    inner: BijectiveConstraint,
    checks: Arc<AtomicUsize>,
    complete: bool,
}

impl Instrumented {
    fn new(complete: bool) -> Self {
        Self {
            inner: bijective(),
            checks: Arc::new(AtomicUsize::new(0)),
            complete,
        }
    }

    fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl Constraint for Instrumented {
    fn name(&self) -> &'static str {
        "instrumented"
    }

    fn commits(&self) -> &CommitLog {
        self.inner.commits()
    }

    fn can_add(&self, alignment: &Alignment) -> Result<bool> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.can_add(alignment)
    }

    fn add(&self, alignment: Arc<Alignment>) -> Result<Self> {
        Ok(Self {
            inner: self.inner.add(alignment)?,
            checks: Arc::clone(&self.checks),
            complete: self.complete,
        })
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

/// `n` candidates that never conflict with each other.
fn disjoint_pairs(n: usize) -> AlignmentSet {
    (0..n)
        .map(|i| link(&format!("l{}", i), &format!("r{}", i), 0.5))
        .collect()
}

fn searches<C: Constraint>(empty: C) -> Vec<Box<dyn Matcher>>
where
    C: 'static,
{
    vec![
        Box::new(UniqueAssignment::new(empty.clone())),
        Box::new(BeamSearch::new(empty.clone())),
        Box::new(
            MonteCarloTreeSearch::new(empty)
                .with_max_iterations(2_000)
                .with_seed(17),
        ),
    ]
}

#[test]
fn test_matcher_ids() {
    assert_eq!(ThresholdMatcher::default().id(), "threshold");
    assert_eq!(UniqueAssignment::new(bijective()).id(), "unique");
    assert_eq!(UniqueAssignment::greedy(bijective()).id(), "greedy");
    assert_eq!(BeamSearch::new(bijective()).id(), "beam-search");
    assert_eq!(MonteCarloTreeSearch::new(bijective()).id(), "monte-carlo");
}

#[test]
fn test_threshold_matcher_filters() {
    let result = ThresholdMatcher::default().align(&five_alignments()).unwrap();
    assert_eq!(
        link_names(&result),
        names(&[("id1", "id1"), ("id1", "id2"), ("id2", "id2")])
    );
}

#[test]
fn test_threshold_matcher_idempotent() {
    let matcher = ThresholdMatcher::new(0.3);
    let once = matcher.align(&dense_grid(6)).unwrap();
    let twice = matcher.align(&once).unwrap();
    assert!(!once.is_empty());
    assert_eq!(link_names(&once), link_names(&twice));
    assert_eq!(once.len(), twice.len());
}

#[test]
fn test_threshold_matcher_keeps_committed_below_cutoff() {
    let committed: AlignmentSet = vec![link("id9", "id9", 0.1)].into();
    let result = ThresholdMatcher::default()
        .align_with(&five_alignments(), &committed, &NoOpListener)
        .unwrap();
    assert!(result.contains(&link("id9", "id9", 0.1)));
    assert_eq!(result.len(), 4);
}

#[test]
fn test_unique_bijective_is_optimal() {
    let result = UniqueAssignment::new(bijective())
        .align(&five_alignments())
        .unwrap();
    assert_eq!(
        link_names(&result),
        names(&[("id1", "id1"), ("id2", "id2"), ("id3", "id3")])
    );
}

#[test]
fn test_unique_respects_threshold() {
    let result = UniqueAssignment::new(bijective())
        .with_threshold(0.5)
        .align(&five_alignments())
        .unwrap();
    assert_eq!(
        link_names(&result),
        names(&[("id1", "id1"), ("id2", "id2")])
    );
}

#[test]
fn test_unique_align_with_committed() {
    let candidates: AlignmentSet = vec![
        link("id1", "id1", 0.5),
        link("id1", "id2", 0.9),
        link("id2", "id2", 0.7),
        link("id3", "id1", 0.1),
        link("id3", "id3", 0.1),
        link("id2", "id3", 0.1),
    ]
    .into();
    let committed: AlignmentSet = vec![link("id1", "id2", 1.0)].into();

    let result = UniqueAssignment::new(bijective())
        .align_with(&candidates, &committed, &NoOpListener)
        .unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.contains(&link("id1", "id2", 1.0)));
    assert!(!result.contains(&link("id1", "id2", 0.9)));
    assert_eq!(
        link_names(&result),
        names(&[("id1", "id2"), ("id2", "id3"), ("id3", "id1")])
    );
}

#[test]
fn test_unique_dense_grid_is_perfect() {
    let grid = dense_grid(10);
    let result = UniqueAssignment::new(bijective()).align(&grid).unwrap();
    assert_eq!(result.len(), 10);
    assert_feasible(&bijective(), &result);
}

#[test]
fn test_unique_relaxed_policy_scans_greedily() {
    let result = UniqueAssignment::new(BijectiveConstraint::new(Surjection::Surjective))
        .align(&five_alignments())
        .unwrap();
    assert_eq!(
        link_names(&result),
        names(&[("id1", "id2"), ("id2", "id2"), ("id3", "id3")])
    );
}

#[test]
fn test_unique_threshold_policy_keeps_everything() {
    let result = UniqueAssignment::new(ThresholdConstraint::default())
        .align(&five_alignments())
        .unwrap();
    assert_eq!(result.len(), 5);
}

#[test]
fn test_beam_unbounded_is_optimal() {
    let result = BeamSearch::new(bijective()).align(&five_alignments()).unwrap();
    assert_eq!(
        link_names(&result),
        names(&[("id1", "id1"), ("id2", "id2"), ("id3", "id3")])
    );
}

#[test]
fn test_beam_width_trades_optimality() {
    // Width 1 commits to the single best alignment first.
    let narrow = BeamSearch::new(bijective())
        .with_width(1)
        .align(&five_alignments())
        .unwrap();
    assert_eq!(
        link_names(&narrow),
        names(&[("id1", "id2"), ("id3", "id3")])
    );

    let wide = BeamSearch::new(bijective())
        .with_width(16)
        .align(&five_alignments())
        .unwrap();
    assert_eq!(wide.len(), 3);
    assert!(score(&wide) > score(&narrow));
}

#[test]
fn test_beam_threshold_policy_returns_all() {
    for width in [Some(1), Some(2), Some(5), None] {
        let mut matcher = BeamSearch::new(ThresholdConstraint::default());
        if let Some(width) = width {
            matcher = matcher.with_width(width);
        }
        let result = matcher.align(&five_alignments()).unwrap();
        assert_eq!(result.len(), 5, "width {:?}", width);
    }
}

#[test]
fn test_beam_ignores_input_order() {
    let mut reversed: Vec<Alignment> = five_alignments().into_iter().collect();
    reversed.reverse();
    let reversed = AlignmentSet::from(reversed);

    let matcher = BeamSearch::new(bijective()).with_width(1);
    let a = matcher.align(&five_alignments()).unwrap();
    let b = matcher.align(&reversed).unwrap();
    assert_eq!(link_names(&a), link_names(&b));
}

#[test]
fn test_beam_reports_levels() {
    let listener = CountingListener::new();
    BeamSearch::new(bijective())
        .align_with(&five_alignments(), &AlignmentSet::new(), &listener)
        .unwrap();
    assert!(listener.level_count() >= 3);
    assert!(listener.improvement_count() >= 1);
    assert_eq!(listener.stage_count(), 3);
}

#[test]
fn test_mcts_finds_optimum_when_tree_is_small() {
    let result = MonteCarloTreeSearch::new(bijective())
        .with_seed(42)
        .align(&five_alignments())
        .unwrap();
    assert_eq!(
        link_names(&result),
        names(&[("id1", "id1"), ("id2", "id2"), ("id3", "id3")])
    );
}

#[test]
fn test_mcts_threshold_policy_returns_all() {
    let result = MonteCarloTreeSearch::new(ThresholdConstraint::default())
        .with_max_iterations(10)
        .with_seed(1)
        .align(&five_alignments())
        .unwrap();
    assert_eq!(result.len(), 5);
}

#[test]
fn test_mcts_budget_never_regresses() {
    let grid = dense_grid(7);
    let mut previous = f64::NEG_INFINITY;
    for iterations in [1, 10, 100, 1_000] {
        let result = MonteCarloTreeSearch::new(bijective())
            .with_max_iterations(iterations)
            .with_seed(2024)
            .align(&grid)
            .unwrap();
        assert_feasible(&bijective(), &result);
        let s = score(&result);
        assert!(s >= previous, "{} iterations scored {} < {}", iterations, s, previous);
        previous = s;
    }
}

#[test]
fn test_mcts_seed_is_reproducible() {
    let grid = dense_grid(6);
    let matcher = MonteCarloTreeSearch::new(bijective())
        .with_max_iterations(300)
        .with_seed(9);
    let a = matcher.align(&grid).unwrap();
    let b = matcher.align(&grid).unwrap();
    assert_eq!(link_names(&a), link_names(&b));
}

#[test]
fn test_mcts_zero_budget_returns_committed() {
    let committed: AlignmentSet = vec![link("id1", "id1", 0.5)].into();
    let result = MonteCarloTreeSearch::new(bijective())
        .with_max_iterations(0)
        .align_with(&five_alignments(), &committed, &NoOpListener)
        .unwrap();
    assert_eq!(link_names(&result), names(&[("id1", "id1")]));
}

#[test]
fn test_results_are_feasible() {
    let grid = dense_grid(5);
    for matcher in searches(bijective()) {
        let result = matcher.align(&grid).unwrap();
        assert!(!result.is_empty(), "{}", matcher.id());
        assert_feasible(&bijective(), &result);
    }
}

#[test]
fn test_committed_always_kept() {
    let committed: AlignmentSet = vec![link("id3", "id1", 0.05)].into();
    for matcher in searches(bijective()) {
        let result = matcher
            .align_with(&five_alignments(), &committed, &NoOpListener)
            .unwrap();
        assert!(result.contains(&link("id3", "id1", 0.05)), "{}", matcher.id());
        assert_feasible(&bijective(), &result);
    }
}

#[test]
fn test_committed_conflict_is_unsolvable() {
    let committed: AlignmentSet = vec![link("id1", "id1", 0.5), link("id1", "id2", 0.9)].into();
    for matcher in searches(bijective()) {
        let listener = CountingListener::new();
        let err = matcher
            .align_with(&five_alignments(), &committed, &listener)
            .unwrap_err();
        assert!(
            matches!(err, LinkForgeError::UnsolvableConstraint(_)),
            "{}: {}",
            matcher.id(),
            err
        );
        assert_eq!(listener.critical_count(), 1);
    }
}

#[test]
fn test_unsupported_candidates_dropped_with_warning() {
    let mut candidates: AlignmentSet = valid_sequence().into();
    candidates.add(unsupported());

    for matcher in searches(TaxonomicConstraint::default()) {
        let listener = CountingListener::new();
        let result = matcher
            .align_with(&candidates, &AlignmentSet::new(), &listener)
            .unwrap();
        assert_eq!(result.len(), 8, "{}", matcher.id());
        assert!(!result.contains(&unsupported()));
        assert_eq!(listener.warning_count(), 1);
        assert_feasible(&TaxonomicConstraint::default(), &result);
    }
}

#[test]
fn test_unsupported_committed_is_unsolvable() {
    let committed: AlignmentSet = vec![unsupported()].into();
    let err = UniqueAssignment::new(TaxonomicConstraint::default())
        .align_with(&five_alignments(), &committed, &NoOpListener)
        .unwrap_err();
    assert!(matches!(err, LinkForgeError::UnsolvableConstraint(_)));
}

#[test]
fn test_any_constraint_drives_matchers() {
    let empty: AnyConstraint = bijective().into();
    let result = BeamSearch::new(empty).align(&five_alignments()).unwrap();
    assert_eq!(result.len(), 3);
}

#[test]
fn test_greedy_does_not_solve_assignment() {
    let greedy = UniqueAssignment::greedy(bijective())
        .align(&five_alignments())
        .unwrap();
    assert_eq!(
        link_names(&greedy),
        names(&[("id1", "id2"), ("id3", "id3")])
    );

    let unique = UniqueAssignment::new(bijective())
        .align(&five_alignments())
        .unwrap();
    assert_eq!(unique.len(), 3);
}

#[test]
fn test_incomplete_result_is_unsolvable() {
    let matchers: Vec<Box<dyn Matcher>> = vec![
        Box::new(UniqueAssignment::new(Instrumented::new(false))),
        Box::new(UniqueAssignment::greedy(Instrumented::new(false))),
    ];
    for matcher in matchers {
        let listener = CountingListener::new();
        let err = matcher
            .align_with(&five_alignments(), &AlignmentSet::new(), &listener)
            .unwrap_err();
        assert!(
            matches!(err, LinkForgeError::UnsolvableConstraint(_)),
            "{}",
            matcher.id()
        );
    }

    let complete = UniqueAssignment::greedy(Instrumented::new(true))
        .align(&five_alignments())
        .unwrap();
    assert_eq!(complete.len(), 2);
}

#[test]
fn test_mcts_rollout_checks_each_candidate_a_bounded_number_of_times() {
    let n = 500;
    let empty = Instrumented::new(true);
    let result = MonteCarloTreeSearch::new(empty.clone())
        .with_max_iterations(1)
        .with_seed(5)
        .align(&disjoint_pairs(n))
        .unwrap();

    assert_eq!(result.len(), n);
    assert!(
        empty.checks() <= 4 * n,
        "{} feasibility checks for {} candidates",
        empty.checks(),
        n
    );
}

#[test]
fn test_mcts_rollout_respects_policy() {
    let result = MonteCarloTreeSearch::new(bijective())
        .with_max_iterations(1)
        .with_seed(9)
        .align(&dense_grid(12))
        .unwrap();
    assert_feasible(&bijective(), &result);
}
