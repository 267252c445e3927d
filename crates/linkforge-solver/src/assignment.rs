//! Maximum-weight bipartite matching.
//!
//! Used by unique assignment when the constraint is strict one-to-one. The
//! edge set is split into connected components; each component is solved
//! exactly with the Hungarian (Kuhn-Munkres) algorithm on a dense matrix,
//! unless the matrix would exceed [`MAX_DENSE_CELLS`], in which case the
//! component falls back to a greedy pass.

use std::collections::{HashMap, HashSet};

/// Largest dense cost matrix solved exactly.
pub const MAX_DENSE_CELLS: usize = 1 << 22;

/// A weighted edge between a left and a right vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub left: usize,
    pub right: usize,
    pub weight: f64,
}

/// The chosen edges of a matching.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matching {
    /// Indices into the input edge slice, ascending.
    pub edges: Vec<usize>,
    /// Components too large for the exact solver.
    pub greedy_components: usize,
}

/// Finds a matching maximizing the total weight of the chosen edges.
///
/// Weights are expected to be positive. Parallel edges are allowed; at most
/// one of them is chosen.
///
/// # Example
///
/// ```
/// use linkforge_solver::assignment::{max_weight_matching, Edge};
///
/// // Greedy would take the 0.9 edge and stop at one pair.
/// let edges = [
///     Edge { left: 0, right: 0, weight: 0.5 },
///     Edge { left: 0, right: 1, weight: 0.9 },
///     Edge { left: 1, right: 1, weight: 0.7 },
/// ];
/// assert_eq!(max_weight_matching(&edges).edges, vec![0, 2]);
/// ```
pub fn max_weight_matching(edges: &[Edge]) -> Matching {
    let mut matching = Matching::default();
    for component in components(edges) {
        let (chosen, exact) = solve_component(edges, &component);
        if !exact {
            matching.greedy_components += 1;
        }
        matching.edges.extend(chosen);
    }
    matching.edges.sort_unstable();
    matching
}

/// Groups edge indices into connected components, in order of first edge.
fn components(edges: &[Edge]) -> Vec<Vec<usize>> {
    // Union-find over left and right vertices, keyed by (side, id).
    let mut vertex: HashMap<(bool, usize), usize> = HashMap::new();
    let mut parent: Vec<usize> = Vec::new();

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut id = |key: (bool, usize), parent: &mut Vec<usize>| -> usize {
        *vertex.entry(key).or_insert_with(|| {
            parent.push(parent.len());
            parent.len() - 1
        })
    };

    let mut endpoints = Vec::with_capacity(edges.len());
    for e in edges {
        let l = id((false, e.left), &mut parent);
        let r = id((true, e.right), &mut parent);
        let (rl, rr) = (find(&mut parent, l), find(&mut parent, r));
        if rl != rr {
            parent[rr] = rl;
        }
        endpoints.push(l);
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    for (i, &l) in endpoints.iter().enumerate() {
        let root = find(&mut parent, l);
        let g = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(i);
    }
    groups
}

/// Solves one component; returns chosen edge indices and whether the
/// solution is exact.
fn solve_component(edges: &[Edge], component: &[usize]) -> (Vec<usize>, bool) {
    let mut rows: HashMap<usize, usize> = HashMap::new();
    let mut cols: HashMap<usize, usize> = HashMap::new();
    for &i in component {
        let n = rows.len();
        rows.entry(edges[i].left).or_insert(n);
        let m = cols.len();
        cols.entry(edges[i].right).or_insert(m);
    }
    let (n, m) = (rows.len(), cols.len());

    if n.saturating_mul(m) > MAX_DENSE_CELLS {
        return (greedy(edges, component), false);
    }

    // Best edge per cell; the solver works on rows <= cols.
    let transpose = n > m;
    let (rn, cm) = if transpose { (m, n) } else { (n, m) };
    let mut best: Vec<Option<usize>> = vec![None; rn * cm];
    for &i in component {
        let (mut r, mut c) = (rows[&edges[i].left], cols[&edges[i].right]);
        if transpose {
            std::mem::swap(&mut r, &mut c);
        }
        let cell = &mut best[r * cm + c];
        if cell.map_or(true, |j| edges[j].weight < edges[i].weight) {
            *cell = Some(i);
        }
    }

    let cost: Vec<f64> = best
        .iter()
        .map(|cell| cell.map_or(0.0, |i| -edges[i].weight))
        .collect();
    let assigned = hungarian(&cost, rn, cm);

    let chosen = assigned
        .into_iter()
        .enumerate()
        .filter_map(|(r, c)| c.and_then(|c| best[r * cm + c]))
        .collect();
    (chosen, true)
}

/// Minimum-cost assignment of every row of an `n x m` matrix (`n <= m`).
/// Returns the column of each row.
fn hungarian(cost: &[f64], n: usize, m: usize) -> Vec<Option<usize>> {
    debug_assert!(n <= m);
    // 1-based potentials; column 0 is a sentinel.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=m {
                if !used[j] {
                    let cur = cost[(i0 - 1) * m + (j - 1)] - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assigned = vec![None; n];
    for j in 1..=m {
        if p[j] != 0 {
            assigned[p[j] - 1] = Some(j - 1);
        }
    }
    assigned
}

fn greedy(edges: &[Edge], component: &[usize]) -> Vec<usize> {
    let mut order = component.to_vec();
    order.sort_by(|&a, &b| edges[b].weight.total_cmp(&edges[a].weight).then(a.cmp(&b)));
    let mut left_used = HashSet::new();
    let mut right_used = HashSet::new();
    let mut chosen = Vec::new();
    for i in order {
        let e = edges[i];
        if !left_used.contains(&e.left) && !right_used.contains(&e.right) {
            left_used.insert(e.left);
            right_used.insert(e.right);
            chosen.push(i);
        }
    }
    chosen
}
