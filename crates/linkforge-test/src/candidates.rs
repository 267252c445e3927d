//! Canonical candidate sets.

use linkforge_core::AlignmentSet;

use crate::entity::{link, local_name};

/// The five-alignment example: two conflicting high scorers on `id1`/`id2`
/// and a weak diagonal.
///
/// Under strict one-to-one linking the optimal subset is
/// `{(id1,id1), (id2,id2), (id3,id3)}`.
pub fn five_alignments() -> AlignmentSet {
    vec![
        link("id1", "id1", 0.5),
        link("id1", "id2", 0.9),
        link("id2", "id2", 0.7),
        link("id3", "id3", 0.1),
        link("id2", "id3", 0.0),
    ]
    .into()
}

/// A dense `n x n` grid of candidates with reproducible probabilities in
/// `[0, 0.9]`, so that many alignments compete for each entity.
pub fn dense_grid(n: usize) -> AlignmentSet {
    let mut set = AlignmentSet::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let probability = ((i * 7 + j * 3 + i * j) % 10) as f64 / 10.0;
            set.add(link(&format!("l{}", i), &format!("r{}", j), probability));
        }
    }
    set
}

/// Returns the `(left, right)` local names of every alignment, sorted.
pub fn link_names(set: &AlignmentSet) -> Vec<(String, String)> {
    let mut names: Vec<(String, String)> = set
        .iter()
        .map(|a| {
            (
                local_name(a.entity1()).to_string(),
                local_name(a.entity2()).to_string(),
            )
        })
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_alignments() {
        let set = five_alignments();
        assert_eq!(set.len(), 5);
        assert_eq!(link_names(&set)[0], ("id1".to_string(), "id1".to_string()));
    }

    #[test]
    fn test_dense_grid_probabilities_in_range() {
        let grid = dense_grid(4);
        assert_eq!(grid.len(), 16);
        assert!(grid
            .iter()
            .all(|a| (0.0..=0.9).contains(&a.probability())));
    }
}
