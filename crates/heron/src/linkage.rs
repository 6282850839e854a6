use crate::algo::Method;
use crate::distance::Condensed;
use serde::{Deserialize, Serialize};

/// One agglomeration step, in the SciPy linkage convention: leaves are `0..n`, the cluster
/// created by step `i` is `n + i`, and `left < right`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub height: f64,
    pub size: usize,
}

const NONE: usize = usize::MAX;

struct NearestNeighbors {
    nn: Vec<usize>,
    dist: Vec<f64>,
}

impl NearestNeighbors {
    /// Rescans the closest active slot `j > i`. Ties keep the lowest slot.
    fn refresh(&mut self, i: usize, d: &Condensed, active: &[bool]) {
        let mut best = NONE;
        let mut best_d = f64::INFINITY;
        for j in (i + 1)..active.len() {
            if !active[j] {
                continue;
            }
            let dij = d.get(i, j);
            if best == NONE || dij < best_d {
                best = j;
                best_d = dij;
            }
        }
        self.nn[i] = best;
        self.dist[i] = best_d;
    }
}

/// Generic agglomerative clustering with a cached nearest-neighbor list.
///
/// Works for every Lance-Williams method, including the non-reducible centroid/median
/// criteria, because a cached neighbor is re-validated whenever one of its endpoints merges or a
/// merged distance drops below it. Typical cost is O(n²).
pub(crate) fn linkage(mut d: Condensed, method: Method) -> Vec<Merge> {
    let n = d.len();
    if n < 2 {
        return Vec::new();
    }

    let mut active = vec![true; n];
    let mut size = vec![1usize; n];
    let mut label: Vec<usize> = (0..n).collect();
    let mut nbrs = NearestNeighbors {
        nn: vec![NONE; n],
        dist: vec![f64::INFINITY; n],
    };
    for i in 0..n - 1 {
        nbrs.refresh(i, &d, &active);
    }

    let mut merges = Vec::with_capacity(n - 1);
    for step in 0..n - 1 {
        let mut a = NONE;
        for i in 0..n {
            if !active[i] || nbrs.nn[i] == NONE {
                continue;
            }
            if a == NONE || nbrs.dist[i] < nbrs.dist[a] {
                a = i;
            }
        }
        if a == NONE {
            break;
        }
        let b = nbrs.nn[a];
        let d_ab = d.get(a, b);

        merges.push(Merge {
            left: label[a].min(label[b]),
            right: label[a].max(label[b]),
            height: d_ab,
            size: size[a] + size[b],
        });

        // `b` survives as the merged cluster; `a` retires.
        active[a] = false;
        for k in 0..n {
            if !active[k] || k == b {
                continue;
            }
            let updated = method.update(d.get(k, a), d.get(k, b), d_ab, size[a], size[b], size[k]);
            d.set(k, b, updated);
        }
        size[b] += size[a];
        label[b] = n + step;

        for k in 0..b {
            if !active[k] {
                continue;
            }
            if nbrs.nn[k] == a || nbrs.nn[k] == b {
                nbrs.refresh(k, &d, &active);
            } else {
                let dkb = d.get(k, b);
                if dkb < nbrs.dist[k] || (dkb == nbrs.dist[k] && b < nbrs.nn[k]) {
                    nbrs.nn[k] = b;
                    nbrs.dist[k] = dkb;
                }
            }
        }
        nbrs.refresh(b, &d, &active);
        nbrs.nn[a] = NONE;
    }

    merges
}

/// Leaf indices in tree order: a pre-order walk from the root taking `left` before `right`.
pub(crate) fn leaves_list(merges: &[Merge]) -> Vec<usize> {
    let n = merges.len() + 1;
    if merges.is_empty() {
        return Vec::new();
    }
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![n + merges.len() - 1];
    while let Some(node) = stack.pop() {
        if node < n {
            order.push(node);
            continue;
        }
        let m = &merges[node - n];
        stack.push(m.right);
        stack.push(m.left);
    }
    order
}
