#![forbid(unsafe_code)]

//! Identifier model and axis transforms for dream-heatmap (headless).
//!
//! The central type is [`IdMapper`]: an immutable mapping from visual index to original id with
//! named groups and gap markers. Split, reorder, cluster and zoom each return a new mapper, so a
//! pixel selection can always be resolved back to exact ids.

pub mod axis;
pub mod composite;
pub mod error;
pub mod id;
pub mod mapper;
pub mod matrix;
pub mod metadata;
pub mod pipeline;
pub mod reorder;
pub mod split;

pub use axis::Axis;
pub use composite::{CompositeIdMapper, Direction, PanelMapping};
pub use error::{Error, Result};
pub use id::{Id, ids};
pub use mapper::{DEFAULT_GROUP, GroupSpan, IdMapper, MapperState, SplitGroup};
pub use matrix::{NumericMatrix, Scaling};
pub use metadata::{MetaValue, MetadataTable};
pub use pipeline::{
    AxisTransform, Clusterer, DirectClusterer, ReorderSpec, SplitSpec, TransformResult,
};
pub use reorder::{Ascending, compute_order};
pub use split::{GROUP_KEY_SEPARATOR, split_by_assignments, split_by_columns};

pub use heron::{ClusterOptions, ClusterResult, DendrogramNode, Method, Metric};
