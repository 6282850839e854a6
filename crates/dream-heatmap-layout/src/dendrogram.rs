//! Dendrogram geometry: cluster merges as U-shaped links in pixel space.
//!
//! The leaf axis follows the cell centers of the axis [`CellLayout`]; the height axis maps merge
//! distances linearly onto `[0, extent]`, with the tallest merge at `extent`. For left/top
//! dendrograms the renderer measures height outward from the heatmap, for right/bottom inward
//! from the far edge; the link values themselves do not depend on the side.

use crate::cell::CellLayout;
use crate::geometry::Edge;
use dream_heatmap_core::{ClusterResult, Id, IdMapper};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type DendrogramSide = Edge;

/// One merge: a vertical at each child, joined by a horizontal at the merge height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DendrogramLink {
    pub leaf_left: f64,
    pub leaf_right: f64,
    pub height_merge: f64,
    pub height_left_child: f64,
    pub height_right_child: f64,
    pub member_ids: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DendrogramSpec {
    pub group: String,
    pub links: Vec<DendrogramLink>,
    pub side: DendrogramSide,
    /// Start of the dendrogram band on the height axis.
    pub offset: f64,
    pub extent: f64,
}

/// Links for one cluster result whose first leaf sits at visual index `group_offset`.
///
/// Returns `None` when the result has no merges (fewer than two leaves).
pub fn compute_dendrogram(
    result: &ClusterResult<Id>,
    cells: &CellLayout,
    side: DendrogramSide,
    extent: f64,
    group_offset: usize,
) -> Option<DendrogramSpec> {
    if result.dendrogram_nodes.is_empty() {
        return None;
    }
    let max_height = match result.max_height() {
        h if h > 0.0 => h,
        _ => 1.0,
    };
    let scale = |h: f64| h / max_height * extent;
    let leaf = |pos: f64| cells.center_at(group_offset as f64 + pos);

    let links = result
        .dendrogram_nodes
        .iter()
        .map(|node| DendrogramLink {
            leaf_left: leaf(node.left),
            leaf_right: leaf(node.right),
            height_merge: scale(node.height),
            height_left_child: scale(node.left_height),
            height_right_child: scale(node.right_height),
            member_ids: node.member_ids.clone(),
        })
        .collect();
    Some(DendrogramSpec {
        group: String::new(),
        links,
        side,
        offset: 0.0,
        extent,
    })
}

/// One spec per clustered group of `mapper`, each anchored at that group's span.
pub fn compute_axis_dendrograms(
    results: &IndexMap<String, Arc<ClusterResult<Id>>>,
    mapper: &IdMapper,
    cells: &CellLayout,
    side: DendrogramSide,
    extent: f64,
    band_offset: f64,
) -> Vec<DendrogramSpec> {
    let specs: Vec<DendrogramSpec> = mapper
        .group_spans()
        .filter_map(|span| {
            let result = results.get(span.name)?;
            let mut spec = compute_dendrogram(result, cells, side, extent, span.start)?;
            spec.group = span.name.to_string();
            spec.offset = band_offset;
            Some(spec)
        })
        .collect();
    tracing::trace!(%side, groups = specs.len(), "dendrogram specs");
    specs
}
