//! Whole-figure geometry.
//!
//! Horizontally, left to right: padding, left dendrogram, left annotations, left labels, the
//! heatmap, right labels, right annotations, right dendrogram, right padding, and finally the
//! legend panel when there is one. Vertically, top to bottom: padding, title band, top
//! dendrogram, top annotations, top labels, the heatmap, bottom labels, bottom annotations,
//! bottom dendrogram, padding.

use crate::cell::{CellLayout, GapSizes};
use crate::config::{CellSizing, LayoutConfig};
use crate::geometry::{Edge, Rect};
use dream_heatmap_core::IdMapper;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

/// One extent per heatmap edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeExtents {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl EdgeExtents {
    pub fn get(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, edge: Edge, value: f64) {
        match edge {
            Edge::Left => self.left = value,
            Edge::Right => self.right = value,
            Edge::Top => self.top = value,
            Edge::Bottom => self.bottom = value,
        }
    }

    pub fn only(edge: Edge, value: f64) -> Self {
        let mut out = Self::default();
        out.set(edge, value);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendSize {
    pub width: f64,
    pub height: f64,
}

/// Space requirements gathered from everything drawn around the heatmap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutInputs {
    /// Side of the row dendrogram (`Left` or `Right`), if any.
    pub row_dendrogram: Option<Edge>,
    /// Side of the column dendrogram (`Top` or `Bottom`), if any.
    pub col_dendrogram: Option<Edge>,
    pub annotations: EdgeExtents,
    pub labels: EdgeExtents,
    pub legend: Option<LegendSize>,
    pub row_gaps: Option<GapSizes>,
    pub col_gaps: Option<GapSizes>,
    pub has_title: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    pub heatmap: Rect,
    pub row_cells: CellLayout,
    pub col_cells: CellLayout,
    pub total_width: f64,
    pub total_height: f64,
    pub n_rows: usize,
    pub n_cols: usize,
    pub row_dendro_width: f64,
    pub col_dendro_height: f64,
    pub row_dendro_side: Edge,
    pub col_dendro_side: Edge,
    pub row_dendrogram: Option<Rect>,
    pub col_dendrogram: Option<Rect>,
    pub annotations: EdgeExtents,
    pub labels: EdgeExtents,
    pub legend_panel: Option<Rect>,
    pub row_secondary_gaps: Vec<usize>,
    pub col_secondary_gaps: Vec<usize>,
    pub title_y: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutSpecWire<'a> {
    heatmap: Rect,
    row_positions: &'a [f64],
    col_positions: &'a [f64],
    row_cell_size: f64,
    col_cell_size: f64,
    total_width: f64,
    total_height: f64,
    n_rows: usize,
    n_cols: usize,
    row_dendro_width: f64,
    col_dendro_height: f64,
    row_dendro_side: Edge,
    col_dendro_side: Edge,
    #[serde(skip_serializing_if = "Option::is_none")]
    row_dendrogram: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    col_dendrogram: Option<Rect>,
    left_annotation_width: f64,
    right_annotation_width: f64,
    top_annotation_height: f64,
    bottom_annotation_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    legend_panel: Option<Rect>,
    #[serde(skip_serializing_if = "is_empty")]
    row_secondary_gaps: &'a [usize],
    #[serde(skip_serializing_if = "is_empty")]
    col_secondary_gaps: &'a [usize],
    #[serde(skip_serializing_if = "Option::is_none")]
    title_y: Option<f64>,
}

fn is_empty(v: &&[usize]) -> bool {
    v.is_empty()
}

impl Serialize for LayoutSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        LayoutSpecWire {
            heatmap: self.heatmap,
            row_positions: self.row_cells.positions(),
            col_positions: self.col_cells.positions(),
            row_cell_size: self.row_cells.cell_size(),
            col_cell_size: self.col_cells.cell_size(),
            total_width: self.total_width,
            total_height: self.total_height,
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            row_dendro_width: self.row_dendro_width,
            col_dendro_height: self.col_dendro_height,
            row_dendro_side: self.row_dendro_side,
            col_dendro_side: self.col_dendro_side,
            row_dendrogram: self.row_dendrogram,
            col_dendrogram: self.col_dendrogram,
            left_annotation_width: self.annotations.left,
            right_annotation_width: self.annotations.right,
            top_annotation_height: self.annotations.top,
            bottom_annotation_height: self.annotations.bottom,
            legend_panel: self.legend_panel,
            row_secondary_gaps: &self.row_secondary_gaps,
            col_secondary_gaps: &self.col_secondary_gaps,
            title_y: self.title_y,
        }
        .serialize(serializer)
    }
}

impl LayoutSpec {
    /// The cell under a pixel, as `(row, col)` visual indices.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        Some((
            self.row_cells.pixel_to_index(y)?,
            self.col_cells.pixel_to_index(x)?,
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutComposer {
    config: LayoutConfig,
}

impl LayoutComposer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn cell_size(&self, budget: f64, fixed: f64, gaps: f64, count: usize) -> f64 {
        if count == 0 {
            return self.config.clamp_cell(self.config.cell_size);
        }
        let fit = (budget - fixed - gaps) / count as f64;
        match self.config.sizing {
            CellSizing::BudgetFit => self.config.clamp_cell(fit),
            CellSizing::AutoTarget { target_cell_size } => {
                self.config.clamp_cell(fit.min(target_cell_size))
            }
        }
    }

    pub fn compose(&self, rows: &IdMapper, cols: &IdMapper, inputs: &LayoutInputs) -> LayoutSpec {
        self.compose_axes(
            rows.size(),
            rows.gap_positions(),
            cols.size(),
            cols.gap_positions(),
            inputs,
        )
    }

    /// Like [`LayoutComposer::compose`] for axes given by size and gap positions.
    pub fn compose_axes(
        &self,
        n_rows: usize,
        row_gap_positions: &BTreeSet<usize>,
        n_cols: usize,
        col_gap_positions: &BTreeSet<usize>,
        inputs: &LayoutInputs,
    ) -> LayoutSpec {
        let cfg = &self.config;
        let ann = inputs.annotations;
        let lab = inputs.labels;

        let row_dendro = if inputs.row_dendrogram.is_some() {
            cfg.dendrogram_extent
        } else {
            0.0
        };
        let col_dendro = if inputs.col_dendrogram.is_some() {
            cfg.dendrogram_extent
        } else {
            0.0
        };
        let row_side = inputs.row_dendrogram.unwrap_or(Edge::Left);
        let col_side = inputs.col_dendrogram.unwrap_or(Edge::Top);
        let on = |side: Edge, extent: f64, edge: Edge| if side == edge { extent } else { 0.0 };
        let left_d = on(row_side, row_dendro, Edge::Left);
        let right_d = on(row_side, row_dendro, Edge::Right);
        let top_d = on(col_side, col_dendro, Edge::Top);
        let bottom_d = on(col_side, col_dendro, Edge::Bottom);

        let legend = inputs
            .legend
            .filter(|l| l.width > 0.0 && l.height > 0.0);
        let right_padding = if legend.is_some() { 0.0 } else { cfg.padding };
        let title_height = if inputs.has_title {
            cfg.title_height
        } else {
            0.0
        };

        let fixed_width = cfg.padding
            + right_padding
            + left_d
            + right_d
            + ann.left
            + ann.right
            + lab.left
            + lab.right;
        let fixed_height = cfg.padding * 2.0
            + title_height
            + top_d
            + bottom_d
            + ann.top
            + ann.bottom
            + lab.top
            + lab.bottom;

        let uniform = GapSizes::uniform(cfg.gap_size);
        let row_gaps = inputs.row_gaps.as_ref().unwrap_or(&uniform);
        let col_gaps = inputs.col_gaps.as_ref().unwrap_or(&uniform);

        let col_cell = self.cell_size(
            cfg.max_width,
            fixed_width,
            col_gaps.total(col_gap_positions),
            n_cols,
        );
        let row_cell = self.cell_size(
            cfg.max_height,
            fixed_height,
            row_gaps.total(row_gap_positions),
            n_rows,
        );

        let heatmap_x = cfg.padding + left_d + ann.left + lab.left;
        let heatmap_y = cfg.padding + title_height + top_d + ann.top + lab.top;
        let row_cells = CellLayout::new(n_rows, row_cell, row_gap_positions, row_gaps, heatmap_y);
        let col_cells = CellLayout::new(n_cols, col_cell, col_gap_positions, col_gaps, heatmap_x);
        let heatmap = Rect::new(
            heatmap_x,
            heatmap_y,
            col_cells.total_size(),
            row_cells.total_size(),
        );

        let row_dendrogram = inputs.row_dendrogram.map(|side| match side {
            Edge::Right => Rect::new(
                heatmap.right() + ann.right + lab.right,
                heatmap.y,
                row_dendro,
                heatmap.height,
            ),
            _ => Rect::new(cfg.padding, heatmap.y, row_dendro, heatmap.height),
        });
        let col_dendrogram = inputs.col_dendrogram.map(|side| match side {
            Edge::Bottom => Rect::new(
                heatmap.x,
                heatmap.bottom() + ann.bottom + lab.bottom,
                heatmap.width,
                col_dendro,
            ),
            _ => Rect::new(heatmap.x, cfg.padding + title_height, heatmap.width, col_dendro),
        });

        let mut total_width = heatmap.right() + ann.right + lab.right + right_d + right_padding;
        let heatmap_bottom = heatmap.bottom() + ann.bottom + lab.bottom + bottom_d;

        let legend_panel = legend.map(|l| {
            Rect::new(total_width + cfg.legend_gap, heatmap_y, l.width, l.height)
        });
        if let Some(panel) = &legend_panel {
            total_width = panel.right() + cfg.legend_margin;
        }
        let legend_bottom = legend_panel.map_or(0.0, |p| p.bottom());
        let total_height = heatmap_bottom.max(legend_bottom) + cfg.padding;

        tracing::debug!(
            n_rows,
            n_cols,
            row_cell,
            col_cell,
            total_width,
            total_height,
            "composed layout"
        );

        LayoutSpec {
            heatmap,
            row_cells,
            col_cells,
            total_width,
            total_height,
            n_rows,
            n_cols,
            row_dendro_width: row_dendro,
            col_dendro_height: col_dendro,
            row_dendro_side: row_side,
            col_dendro_side: col_side,
            row_dendrogram,
            col_dendrogram,
            annotations: ann,
            labels: lab,
            legend_panel,
            row_secondary_gaps: inputs
                .row_gaps
                .as_ref()
                .map(GapSizes::secondary_positions)
                .unwrap_or_default(),
            col_secondary_gaps: inputs
                .col_gaps
                .as_ref()
                .map(GapSizes::secondary_positions)
                .unwrap_or_default(),
            title_y: inputs
                .has_title
                .then(|| cfg.padding + title_height * 0.7),
        }
    }
}
