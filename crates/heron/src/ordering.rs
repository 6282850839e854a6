//! Optimal leaf ordering (Bar-Joseph, Gifford & Jaakkola, 2001).
//!
//! For every internal node `v` and every pair of leaves `(u, w)` whose lowest common ancestor is
//! `v`, `best(u, w)` is the minimum sum of adjacent-leaf distances over all orderings of `v`'s
//! subtree that start at `u` and end at `w`. Each leaf pair has exactly one such ancestor, so the
//! table is a single symmetric leaf-by-leaf matrix. Flipping children never changes topology or
//! heights.

use crate::distance::Condensed;
use crate::linkage::{Merge, leaves_list};
use std::ops::Range;

struct Tree<'a> {
    n: usize,
    merges: &'a [Merge],
    /// Leaves in an initial pre-order; every subtree is a contiguous span of it.
    seq: Vec<usize>,
    span: Vec<Range<usize>>,
}

impl<'a> Tree<'a> {
    fn new(merges: &'a [Merge]) -> Self {
        let n = merges.len() + 1;
        let seq = leaves_list(merges);
        let mut pos = vec![0usize; n];
        for (p, &leaf) in seq.iter().enumerate() {
            pos[leaf] = p;
        }
        let mut span: Vec<Range<usize>> = Vec::with_capacity(2 * n - 1);
        for &leaf_pos in &pos {
            span.push(leaf_pos..leaf_pos + 1);
        }
        for m in merges {
            let (l, r) = (&span[m.left], &span[m.right]);
            span.push(l.start.min(r.start)..l.end.max(r.end));
        }
        Self {
            n,
            merges,
            seq,
            span,
        }
    }

    fn children(&self, node: usize) -> Option<(usize, usize)> {
        (node >= self.n).then(|| {
            let m = &self.merges[node - self.n];
            (m.left, m.right)
        })
    }

    /// Leaves that may close an ordering of `node` which opens at the leaf at `seq[p]`: the
    /// leaves of the child not containing it, or the leaf itself when `node` is a leaf.
    fn partners(&self, node: usize, p: usize) -> Range<usize> {
        match self.children(node) {
            None => p..p + 1,
            Some((l, r)) => {
                if self.span[l].contains(&p) {
                    self.span[r].clone()
                } else {
                    self.span[l].clone()
                }
            }
        }
    }
}

struct PairTable {
    n: usize,
    values: Vec<f64>,
}

impl PairTable {
    fn new(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n.saturating_sub(1) / 2],
        }
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.n * i - i * (i + 1) / 2 + (j - i - 1)
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        self.values[self.offset(i, j)]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, v: f64) {
        let at = self.offset(i, j);
        self.values[at] = v;
    }
}

/// Returns `merges` with children swapped where needed so that the pre-order leaf walk is the
/// optimal ordering.
pub(crate) fn optimal_leaf_ordering(merges: &[Merge], d: &Condensed) -> Vec<Merge> {
    if merges.len() < 2 {
        return merges.to_vec();
    }
    let tree = Tree::new(merges);
    let n = tree.n;
    let seq = &tree.seq;
    let mut best = PairTable::new(n);
    let mut scratch: Vec<f64> = Vec::new();

    // Children always precede parents in merge order.
    for (i, m) in merges.iter().enumerate() {
        let v = n + i;
        let (l, r) = (m.left, m.right);
        let right_span = tree.span[r].clone();
        for pu in tree.span[l].clone() {
            let u = seq[pu];
            scratch.clear();
            // scratch[k] = cheapest way to open `l` at u and step across to the right leaf k.
            for pk in right_span.clone() {
                let k = seq[pk];
                let mut c = f64::INFINITY;
                for pm in tree.partners(l, pu) {
                    let m_leaf = seq[pm];
                    let cand = best.get(u, m_leaf) + d.get(m_leaf, k);
                    if cand < c {
                        c = cand;
                    }
                }
                scratch.push(c);
            }
            for pw in right_span.clone() {
                let w = seq[pw];
                let mut c = f64::INFINITY;
                for pk in tree.partners(r, pw) {
                    let k = seq[pk];
                    let cand = scratch[pk - right_span.start] + best.get(k, w);
                    if cand < c {
                        c = cand;
                    }
                }
                best.set(u, w, c);
            }
        }
        tracing::trace!(node = v, "optimal ordering table filled");
    }

    let root = n + merges.len() - 1;
    let (root_l, root_r) = (merges[root - n].left, merges[root - n].right);
    let mut ends = (seq[tree.span[root_l].start], seq[tree.span[root_r].start]);
    let mut lowest = f64::INFINITY;
    for pu in tree.span[root_l].clone() {
        for pw in tree.span[root_r].clone() {
            let c = best.get(seq[pu], seq[pw]);
            if c < lowest {
                lowest = c;
                ends = (seq[pu], seq[pw]);
            }
        }
    }

    let mut pos = vec![0usize; n];
    for (p, &leaf) in seq.iter().enumerate() {
        pos[leaf] = p;
    }

    let mut out = merges.to_vec();
    let mut stack = vec![(root, ends.0, ends.1)];
    while let Some((v, u, w)) = stack.pop() {
        let Some((l, r)) = tree.children(v) else {
            continue;
        };
        let (first, second) = if tree.span[l].contains(&pos[u]) {
            (l, r)
        } else {
            (r, l)
        };
        let mut pick = (u, w);
        let mut lowest = f64::INFINITY;
        for pm in tree.partners(first, pos[u]) {
            let m_leaf = seq[pm];
            let head = best.get(u, m_leaf);
            for pk in tree.partners(second, pos[w]) {
                let k = seq[pk];
                let c = head + d.get(m_leaf, k) + best.get(k, w);
                if c < lowest {
                    lowest = c;
                    pick = (m_leaf, k);
                }
            }
        }
        if first != l {
            let merge = &mut out[v - n];
            std::mem::swap(&mut merge.left, &mut merge.right);
        }
        // Pre-order: `first` must be emitted before `second`.
        stack.push((second, pick.1, w));
        stack.push((first, u, pick.0));
    }
    out
}
