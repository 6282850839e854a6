#![forbid(unsafe_code)]

//! Headless hierarchical agglomerative clustering.
//!
//! `heron` is used by `dream-heatmap-core` to order the items of one heatmap group and to produce
//! the dendrogram drawn next to it. Results are deterministic: identical inputs always give the
//! same merges and the same leaf order.

pub mod algo;
pub mod distance;
pub mod error;
pub mod linkage;
mod ordering;
pub mod tree;

pub use algo::{ClusterOptions, Method, Metric};
pub use error::{Error, Result};
pub use linkage::Merge;
pub use tree::{ClusterResult, DendrogramNode};

use nalgebra::DMatrix;

/// Clusters the rows of `data`; `ids[i]` names row `i`.
///
/// Missing values (NaN) are replaced with their row mean for the distance computation only.
/// Fewer than two rows yield [`ClusterResult::trivial`].
pub fn cluster<I: Clone>(
    data: &DMatrix<f64>,
    ids: &[I],
    opts: &ClusterOptions,
) -> Result<ClusterResult<I>> {
    if data.nrows() != ids.len() {
        return Err(Error::ShapeMismatch {
            rows: data.nrows(),
            ids: ids.len(),
        });
    }
    if ids.len() < 2 {
        return Ok(ClusterResult::trivial(ids));
    }

    let metric = opts.effective_metric();
    if metric != opts.metric {
        tracing::debug!(
            requested = %opts.metric,
            used = %metric,
            method = %opts.method,
            "metric not compatible with linkage method; using euclidean"
        );
    }
    tracing::debug!(
        items = ids.len(),
        features = data.ncols(),
        method = %opts.method,
        metric = %metric,
        optimal_ordering = opts.optimal_ordering,
        "clustering"
    );

    let rows = distance::impute_row_means(data);
    let dist = distance::pairwise(&rows, metric);
    let merges = if opts.optimal_ordering {
        let merges = linkage::linkage(dist.clone(), opts.method);
        ordering::optimal_leaf_ordering(&merges, &dist)
    } else {
        linkage::linkage(dist, opts.method)
    };

    let leaf_indices = linkage::leaves_list(&merges);
    let leaf_order = leaf_indices.iter().map(|&i| ids[i].clone()).collect();
    let dendrogram_nodes = tree::dendrogram_nodes(&merges, ids, &leaf_indices);

    Ok(ClusterResult {
        leaf_order,
        linkage: merges,
        dendrogram_nodes,
        ids: ids.to_vec(),
    })
}
