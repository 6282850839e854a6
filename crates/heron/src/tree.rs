use crate::linkage::Merge;
use serde::{Deserialize, Serialize};

/// One merge of the dendrogram in "dendrogram space": positions are fractional indices along
/// the leaf axis, heights are raw linkage distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DendrogramNode<I> {
    /// Centroid of the left child's leaves on the leaf axis.
    pub left: f64,
    pub right: f64,
    pub height: f64,
    /// 0.0 when the child is a leaf.
    pub left_height: f64,
    pub right_height: f64,
    /// Every leaf under this merge, in leaf order.
    pub member_ids: Vec<I>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResult<I> {
    pub leaf_order: Vec<I>,
    pub linkage: Vec<Merge>,
    pub dendrogram_nodes: Vec<DendrogramNode<I>>,
    /// The ids as given, in input order.
    pub ids: Vec<I>,
}

impl<I: Clone> ClusterResult<I> {
    /// Identity order, no merges. Used for groups too small to cluster.
    pub fn trivial(ids: &[I]) -> Self {
        Self {
            leaf_order: ids.to_vec(),
            linkage: Vec::new(),
            dendrogram_nodes: Vec::new(),
            ids: ids.to_vec(),
        }
    }
}

impl<I> ClusterResult<I> {
    pub fn leaf_count(&self) -> usize {
        self.leaf_order.len()
    }

    pub fn max_height(&self) -> f64 {
        self.dendrogram_nodes
            .iter()
            .map(|n| n.height)
            .fold(0.0, f64::max)
    }
}

/// Builds the renderable nodes for `merges`, whose pre-order walk is `leaf_indices`.
///
/// Because the leaf order is that walk, every subtree occupies a contiguous run of leaf
/// positions; the centroid of a run `[start, end)` is `(start + end - 1) / 2`.
pub(crate) fn dendrogram_nodes<I: Clone>(
    merges: &[Merge],
    ids: &[I],
    leaf_indices: &[usize],
) -> Vec<DendrogramNode<I>> {
    let n = ids.len();
    if merges.is_empty() {
        return Vec::new();
    }
    let mut start = vec![0usize; n + merges.len()];
    for (p, &leaf) in leaf_indices.iter().enumerate() {
        start[leaf] = p;
    }
    let mut size = vec![1usize; n + merges.len()];
    let centroid = |start: usize, size: usize| start as f64 + (size as f64 - 1.0) / 2.0;
    let child_height = |node: usize| if node < n { 0.0 } else { merges[node - n].height };

    let mut nodes = Vec::with_capacity(merges.len());
    for (i, m) in merges.iter().enumerate() {
        let id = n + i;
        start[id] = start[m.left].min(start[m.right]);
        size[id] = size[m.left] + size[m.right];
        let members = &leaf_indices[start[id]..start[id] + size[id]];
        nodes.push(DendrogramNode {
            left: centroid(start[m.left], size[m.left]),
            right: centroid(start[m.right], size[m.right]),
            height: m.height,
            left_height: child_height(m.left),
            right_height: child_height(m.right),
            member_ids: members.iter().map(|&leaf| ids[leaf].clone()).collect(),
        });
    }
    nodes
}
