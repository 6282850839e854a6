#![forbid(unsafe_code)]

//! `dream-heatmap` is the headless core of an interactive clustered heatmap.
//!
//! It keeps every pixel traceable to an exact row/column id through splits, clustering,
//! reordering and zoom, and computes the geometry a renderer needs. Nothing here draws.
//!
//! # Features
//!
//! - `layout` (default): pixel layout (`dream_heatmap::layout`) and the [`figure::Figure`]
//!   orchestration with its zoom/selection protocol.

pub use dream_heatmap_core::*;

pub mod cache;

pub use cache::{ClusterCache, DEFAULT_CAPACITY};

#[cfg(feature = "layout")]
pub mod layout {
    pub use dream_heatmap_layout::*;
}

#[cfg(feature = "layout")]
pub mod figure;

#[cfg(feature = "layout")]
pub use figure::{
    AnnotationRequest, AnnotationSource, AxisOptions, Figure, FigureGroup, FigureOptions, FigureSpec,
    HeadlessError, Selection, SelectionRange, ZoomRequest, concat,
};
