//! The per-axis transform chain: split, then cluster or reorder inside every group.
//!
//! Clustering and metadata reordering are mutually exclusive; when both are requested the
//! cluster leaf order wins.

use crate::axis::Axis;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::mapper::IdMapper;
use crate::matrix::NumericMatrix;
use crate::metadata::MetadataTable;
use crate::reorder::{Ascending, compute_order};
use crate::split::{split_by_assignments, split_by_columns};
use heron::{ClusterOptions, ClusterResult};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitSpec {
    /// Group by metadata columns.
    ByColumns(Vec<String>),
    /// Explicit `{group: ids}`.
    Assignments(IndexMap<String, Vec<Id>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReorderSpec {
    pub by: Vec<String>,
    pub ascending: Ascending,
}

impl Default for ReorderSpec {
    fn default() -> Self {
        Self {
            by: Vec::new(),
            ascending: Ascending::All(true),
        }
    }
}

/// Everything the caller asked for on one axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisTransform {
    pub split: Option<SplitSpec>,
    pub cluster: Option<ClusterOptions>,
    pub reorder: Option<ReorderSpec>,
}

impl AxisTransform {
    pub fn is_identity(&self) -> bool {
        self.split.is_none() && self.cluster.is_none() && self.reorder.is_none()
    }
}

/// Produces cluster results for one group. Implementations may cache; they must not change the
/// result for identical inputs.
pub trait Clusterer {
    fn cluster(
        &mut self,
        data: &DMatrix<f64>,
        ids: &[Id],
        options: &ClusterOptions,
    ) -> Result<Arc<ClusterResult<Id>>>;
}

/// Runs `heron` on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectClusterer;

impl Clusterer for DirectClusterer {
    fn cluster(
        &mut self,
        data: &DMatrix<f64>,
        ids: &[Id],
        options: &ClusterOptions,
    ) -> Result<Arc<ClusterResult<Id>>> {
        Ok(Arc::new(heron::cluster(data, ids, options)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub mapper: IdMapper,
    /// Per-group results in group order; `None` when clustering was not requested.
    pub cluster_results: Option<IndexMap<String, Arc<ClusterResult<Id>>>>,
}

pub fn run(
    mapper: &IdMapper,
    matrix: &NumericMatrix,
    axis: Axis,
    metadata: Option<&MetadataTable>,
    transform: &AxisTransform,
    clusterer: &mut dyn Clusterer,
) -> Result<TransformResult> {
    let mut mapper = match &transform.split {
        None => mapper.clone(),
        Some(spec) => {
            let assignments = match spec {
                SplitSpec::ByColumns(columns) => {
                    let metadata = metadata.ok_or(Error::MissingMetadata { axis })?;
                    split_by_columns(metadata, columns)?
                }
                SplitSpec::Assignments(groups) => {
                    split_by_assignments(groups.clone(), mapper.visual_order())?
                }
            };
            mapper.apply_splits(&assignments)?
        }
    };

    if let Some(options) = &transform.cluster {
        let mut results = IndexMap::new();
        let mut orders = IndexMap::new();
        for group in mapper.groups() {
            let result = if group.len() < 2 {
                Arc::new(ClusterResult::trivial(&group.ids))
            } else {
                let data = matrix.items_for(axis, &group.ids)?;
                let result = clusterer.cluster(&data, &group.ids, options)?;
                orders.insert(group.name.clone(), result.leaf_order.clone());
                result
            };
            results.insert(group.name.clone(), result);
        }
        tracing::debug!(%axis, groups = results.len(), "clustered groups");
        mapper = mapper.apply_reorder_within_groups(&orders)?;
        return Ok(TransformResult {
            mapper,
            cluster_results: Some(results),
        });
    }

    if let Some(reorder) = &transform.reorder {
        let metadata = metadata.ok_or(Error::MissingMetadata { axis })?;
        let mut orders = IndexMap::new();
        for group in mapper.groups() {
            let order = compute_order(&group.ids, metadata, &reorder.by, &reorder.ascending)?;
            orders.insert(group.name.clone(), order);
        }
        tracing::debug!(%axis, by = ?reorder.by, "reordered groups");
        mapper = mapper.apply_reorder_within_groups(&orders)?;
    }

    Ok(TransformResult {
        mapper,
        cluster_results: None,
    })
}
