#![forbid(unsafe_code)]

//! Pixel geometry for dream-heatmap.
//!
//! Everything here is a pure function of the mappers and space requirements it is given; no
//! rendering happens in this crate.

pub mod annotation;
pub mod cell;
pub mod composer;
pub mod composite;
pub mod config;
pub mod dendrogram;
pub mod geometry;
pub mod label;
pub mod text;

pub use annotation::{
    AnnotationTrack, CategoryBlock, TrackSpec, category_blocks, categorical_track,
    compute_edge_tracks, total_edge_width,
};
pub use cell::{CellLayout, GapSizes};
pub use composer::{EdgeExtents, LayoutComposer, LayoutInputs, LayoutSpec, LegendSize};
pub use composite::CompositeLayout;
pub use config::{CellSizing, LayoutConfig};
pub use dendrogram::{
    DendrogramLink, DendrogramSide, DendrogramSpec, compute_axis_dendrograms, compute_dendrogram,
};
pub use geometry::{Edge, Rect};
pub use label::{
    LabelMode, LabelSide, LabelSpec, compute_labels, estimate_col_label_extent,
    estimate_row_label_extent,
};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};

use dream_heatmap_core::Axis;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown edge '{edge}' (expected left, right, top or bottom)")]
    UnknownEdge { edge: String },
    #[error("side '{side}' is not valid for the {axis} axis")]
    UnknownSide { side: String, axis: Axis },
    #[error("unknown label mode '{mode}' (expected all, none or auto)")]
    UnknownLabelMode { mode: String },
    #[error("layout config JSON error: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] dream_heatmap_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
