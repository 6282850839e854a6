//! One heatmap, end to end: axis transforms, layout, dendrograms, annotation tracks and labels,
//! plus the zoom and selection protocol a UI drives it with.
//!
//! A [`Figure`] is immutable. Zooming returns a new figure that shares the transformed base
//! (mappers, gap sizes, cluster results) with the one it came from; zoom requests are always
//! interpreted against that un-zoomed base.

use dream_heatmap_core::{
    Axis, AxisTransform, ClusterResult, Clusterer, CompositeIdMapper, Direction, Id, IdMapper,
    MapperState, MetadataTable, NumericMatrix, SplitSpec, pipeline,
};
use dream_heatmap_layout::annotation::MAX_TRACKS_PER_EDGE;
use dream_heatmap_layout::{
    AnnotationTrack, CompositeLayout, DendrogramSpec, DeterministicTextMeasurer, Edge,
    EdgeExtents, GapSizes, LabelMode, LabelSpec, LayoutComposer, LayoutConfig, LayoutInputs,
    LayoutSpec, LegendSize, Rect, TextStyle, TrackSpec, categorical_track,
    compute_axis_dendrograms, compute_edge_tracks, compute_labels, estimate_col_label_extent,
    estimate_row_label_extent, total_edge_width,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Core(#[from] dream_heatmap_core::Error),
    #[error(transparent)]
    Layout(#[from] dream_heatmap_layout::Error),
    #[error("{count} annotation tracks requested on the {edge} edge (at most {max})")]
    TooManyTracks { edge: Edge, count: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Per-axis settings. Sides left unset use the usual placement: row dendrogram left, row labels
/// right, column dendrogram top, column labels bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOptions {
    pub transform: AxisTransform,
    pub show_dendrogram: bool,
    pub dendrogram_side: Option<Edge>,
    pub labels: LabelMode,
    pub label_side: Option<Edge>,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            transform: AxisTransform::default(),
            show_dendrogram: true,
            dendrogram_side: None,
            labels: LabelMode::Auto,
            label_side: None,
        }
    }
}

/// Where an annotation track's payload comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationSource {
    /// Categorical labels from a metadata column of the axis running along the edge; re-sliced
    /// to every view.
    Column(String),
    /// A caller-built payload (bars, sparklines, box plots) handed to the renderer unchanged.
    Payload(Value),
}

/// One track drawn along `edge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRequest {
    #[serde(flatten)]
    pub source: AnnotationSource,
    pub edge: Edge,
    /// Defaults to the column name, or `"annotation"` for payload tracks.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub track_width: Option<f64>,
}

impl AnnotationRequest {
    pub fn column(column: impl Into<String>, edge: Edge) -> Self {
        Self {
            source: AnnotationSource::Column(column.into()),
            edge,
            name: None,
            track_width: None,
        }
    }

    pub fn payload(name: impl Into<String>, payload: Value, edge: Edge) -> Self {
        Self {
            source: AnnotationSource::Payload(payload),
            edge,
            name: Some(name.into()),
            track_width: None,
        }
    }

    fn track(&self, base: &AxisBase, mapper: &IdMapper) -> Result<AnnotationTrack> {
        let mut track = match &self.source {
            AnnotationSource::Column(column) => {
                let metadata = base
                    .metadata
                    .as_ref()
                    .ok_or(dream_heatmap_core::Error::MissingMetadata { axis: base.axis })?;
                let name = self.name.as_deref().unwrap_or(column);
                let mut track = categorical_track(name, metadata, column, mapper.visual_order())?;
                if let Some(width) = self.track_width {
                    track.payload["trackWidth"] = width.into();
                }
                track
            }
            AnnotationSource::Payload(payload) => {
                let name = self.name.as_deref().unwrap_or("annotation");
                AnnotationTrack::new(name, payload.clone())
            }
        };
        if let Some(width) = self.track_width {
            track = track.with_width(width);
        }
        Ok(track)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FigureOptions {
    pub rows: AxisOptions,
    pub cols: AxisOptions,
    pub annotations: Vec<AnnotationRequest>,
    pub layout: LayoutConfig,
    pub legend: Option<LegendSize>,
    pub title: Option<String>,
}

impl FigureOptions {
    /// Options from a partial JSON object; missing fields keep their defaults.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone()).map_err(dream_heatmap_layout::Error::from)?)
    }
}

/// A zoom request from the UI, in visual indices of the un-zoomed figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ZoomRequest {
    /// Rectangle zoom. Bounds are clamped to each axis.
    #[serde(rename_all = "camelCase")]
    Range {
        row_start: i64,
        row_end: i64,
        col_start: i64,
        col_end: i64,
    },
    /// Zoom onto explicit ids, e.g. a clicked dendrogram branch or category block.
    #[serde(rename_all = "camelCase")]
    Ids { row_ids: Vec<Id>, col_ids: Vec<Id> },
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    pub row_start: i64,
    pub row_end: i64,
    pub col_start: i64,
    pub col_end: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub row_ids: Vec<Id>,
    pub col_ids: Vec<Id>,
}

/// The transformed, un-zoomed state of one axis.
#[derive(Debug)]
struct AxisBase {
    axis: Axis,
    mapper: IdMapper,
    gaps: Option<GapSizes>,
    clusters: Option<IndexMap<String, Arc<ClusterResult<Id>>>>,
    metadata: Option<MetadataTable>,
    /// Side of the dendrogram, when the axis is clustered and the dendrogram is shown.
    dendrogram: Option<Edge>,
    label_mode: LabelMode,
    label_side: Edge,
}

fn side_for(axis: Axis, requested: Option<Edge>, default: Edge) -> Result<Edge> {
    match requested {
        None => Ok(default),
        Some(edge) if edge.axis() == axis => Ok(edge),
        Some(edge) => Err(dream_heatmap_layout::Error::UnknownSide {
            side: edge.to_string(),
            axis,
        }
        .into()),
    }
}

impl AxisBase {
    fn build(
        axis: Axis,
        matrix: &NumericMatrix,
        metadata: Option<MetadataTable>,
        options: &AxisOptions,
        config: &LayoutConfig,
        clusterer: &mut dyn Clusterer,
    ) -> Result<Self> {
        let (dendrogram_default, label_default) = match axis {
            Axis::Row => (Edge::Left, Edge::Right),
            Axis::Col => (Edge::Top, Edge::Bottom),
        };
        let dendrogram_side = side_for(axis, options.dendrogram_side, dendrogram_default)?;
        let label_side = side_for(axis, options.label_side, label_default)?;

        let metadata = metadata
            .map(|table| table.aligned_to(matrix.ids(axis)))
            .transpose()?;
        let initial = IdMapper::from_ids(matrix.ids(axis).iter().cloned())?;
        let transformed = pipeline::run(
            &initial,
            matrix,
            axis,
            metadata.as_ref(),
            &options.transform,
            clusterer,
        )?;
        let mapper = transformed.mapper;
        // Only a split on two or more columns is tiered; every other gap is the uniform one.
        let tiered = matches!(
            &options.transform.split,
            Some(SplitSpec::ByColumns(columns)) if columns.len() >= 2
        );
        let gaps = (tiered && !mapper.gap_positions().is_empty())
            .then(|| GapSizes::tiered(&mapper, config.primary_gap, config.secondary_gap));
        let dendrogram = (transformed.cluster_results.is_some() && options.show_dendrogram)
            .then_some(dendrogram_side);

        Ok(Self {
            axis,
            mapper,
            gaps,
            clusters: transformed.cluster_results,
            metadata,
            dendrogram,
            label_mode: options.labels,
            label_side,
        })
    }
}

#[derive(Debug)]
struct Base {
    matrix: NumericMatrix,
    options: FigureOptions,
    rows: AxisBase,
    cols: AxisBase,
}

impl Base {
    fn axis(&self, axis: Axis) -> &AxisBase {
        match axis {
            Axis::Row => &self.rows,
            Axis::Col => &self.cols,
        }
    }

    fn annotation_tracks(
        &self,
        rows: &IdMapper,
        cols: &IdMapper,
    ) -> Result<Vec<(Edge, Vec<AnnotationTrack>)>> {
        let mut out = Vec::new();
        for edge in Edge::ALL {
            let base = self.axis(edge.axis());
            let mapper = match edge.axis() {
                Axis::Row => rows,
                Axis::Col => cols,
            };
            let mut tracks = Vec::new();
            for request in self.options.annotations.iter().filter(|r| r.edge == edge) {
                tracks.push(request.track(base, mapper)?);
            }
            if !tracks.is_empty() {
                out.push((edge, tracks));
            }
        }
        Ok(out)
    }
}

/// A fully laid out heatmap view.
#[derive(Debug, Clone)]
pub struct Figure {
    base: Arc<Base>,
    rows: IdMapper,
    cols: IdMapper,
    layout: LayoutSpec,
    dendrograms: Vec<DendrogramSpec>,
    tracks: Vec<TrackSpec>,
    row_labels: Vec<LabelSpec>,
    col_labels: Vec<LabelSpec>,
}

impl Figure {
    /// Runs split, cluster and reorder on both axes and lays the result out.
    pub fn build(
        matrix: NumericMatrix,
        options: FigureOptions,
        row_metadata: Option<MetadataTable>,
        col_metadata: Option<MetadataTable>,
        clusterer: &mut dyn Clusterer,
    ) -> Result<Self> {
        for edge in Edge::ALL {
            let count = options.annotations.iter().filter(|r| r.edge == edge).count();
            if count > MAX_TRACKS_PER_EDGE {
                return Err(HeadlessError::TooManyTracks {
                    edge,
                    count,
                    max: MAX_TRACKS_PER_EDGE,
                });
            }
        }

        let rows = AxisBase::build(
            Axis::Row,
            &matrix,
            row_metadata,
            &options.rows,
            &options.layout,
            clusterer,
        )?;
        let cols = AxisBase::build(
            Axis::Col,
            &matrix,
            col_metadata,
            &options.cols,
            &options.layout,
            clusterer,
        )?;
        tracing::debug!(
            rows = rows.mapper.size(),
            cols = cols.mapper.size(),
            row_groups = rows.mapper.groups().len(),
            col_groups = cols.mapper.groups().len(),
            "built figure"
        );

        let base = Arc::new(Base {
            matrix,
            options,
            rows,
            cols,
        });
        let (rows, cols) = (base.rows.mapper.clone(), base.cols.mapper.clone());
        let (row_gaps, col_gaps) = (base.rows.gaps.clone(), base.cols.gaps.clone());
        Self::view(base, rows, cols, row_gaps, col_gaps, false)
    }

    fn view(
        base: Arc<Base>,
        rows: IdMapper,
        cols: IdMapper,
        row_gaps: Option<GapSizes>,
        col_gaps: Option<GapSizes>,
        zoomed: bool,
    ) -> Result<Self> {
        let config = &base.options.layout;

        let edge_tracks = base.annotation_tracks(&rows, &cols)?;
        let mut annotations = EdgeExtents::default();
        for (edge, tracks) in &edge_tracks {
            annotations.set(*edge, total_edge_width(tracks));
        }

        let measurer = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_size: config.label_font_size,
        };
        let mut labels = EdgeExtents::default();
        labels.set(
            base.rows.label_side,
            estimate_row_label_extent(rows.visual_order(), base.rows.label_mode, &measurer, &style),
        );
        labels.set(
            base.cols.label_side,
            estimate_col_label_extent(cols.visual_order(), base.cols.label_mode, &measurer, &style),
        );

        // Dendrogram space stays reserved while zoomed so the heatmap does not jump.
        let inputs = LayoutInputs {
            row_dendrogram: base.rows.dendrogram,
            col_dendrogram: base.cols.dendrogram,
            annotations,
            labels,
            legend: base.options.legend,
            row_gaps,
            col_gaps,
            has_title: base.options.title.is_some(),
        };
        let layout = LayoutComposer::new(config.clone()).compose(&rows, &cols, &inputs);

        let mut dendrograms = Vec::new();
        if !zoomed {
            if let (Some(side), Some(clusters), Some(region)) = (
                base.rows.dendrogram,
                &base.rows.clusters,
                layout.row_dendrogram,
            ) {
                dendrograms.extend(compute_axis_dendrograms(
                    clusters,
                    &rows,
                    &layout.row_cells,
                    side,
                    layout.row_dendro_width,
                    region.x,
                ));
            }
            if let (Some(side), Some(clusters), Some(region)) = (
                base.cols.dendrogram,
                &base.cols.clusters,
                layout.col_dendrogram,
            ) {
                dendrograms.extend(compute_axis_dendrograms(
                    clusters,
                    &cols,
                    &layout.col_cells,
                    side,
                    layout.col_dendro_height,
                    region.y,
                ));
            }
        }

        let tracks = edge_tracks
            .iter()
            .flat_map(|(edge, tracks)| compute_edge_tracks(tracks, *edge))
            .collect();
        let font_size = config.label_font_size;
        let row_labels = compute_labels(
            rows.visual_order(),
            &layout.row_cells,
            base.rows.label_mode,
            font_size,
            None,
        );
        let col_labels = compute_labels(
            cols.visual_order(),
            &layout.col_cells,
            base.cols.label_mode,
            font_size,
            None,
        );

        Ok(Self {
            base,
            rows,
            cols,
            layout,
            dendrograms,
            tracks,
            row_labels,
            col_labels,
        })
    }

    /// A new figure for `request`; `self` is unchanged. Zoomed figures carry no dendrograms.
    pub fn zoom(&self, request: &ZoomRequest) -> Result<Self> {
        let base = &self.base;
        let (rows, cols, row_gaps, col_gaps, zoomed) = match request {
            ZoomRequest::Range {
                row_start,
                row_end,
                col_start,
                col_end,
            } => {
                let rows = base.rows.mapper.apply_zoom(*row_start, *row_end)?;
                let cols = base.cols.mapper.apply_zoom(*col_start, *col_end)?;
                let row_window = base.rows.mapper.clamp_range(*row_start, *row_end);
                let col_window = base.cols.mapper.clamp_range(*col_start, *col_end);
                let row_gaps = base
                    .rows
                    .gaps
                    .as_ref()
                    .map(|g| g.remap_for_zoom(row_window.start, row_window.end));
                let col_gaps = base
                    .cols
                    .gaps
                    .as_ref()
                    .map(|g| g.remap_for_zoom(col_window.start, col_window.end));
                (rows, cols, row_gaps, col_gaps, true)
            }
            ZoomRequest::Ids { row_ids, col_ids } => {
                let rows = base.rows.mapper.apply_zoom_by_ids(row_ids)?;
                let cols = base.cols.mapper.apply_zoom_by_ids(col_ids)?;
                (rows, cols, None, None, true)
            }
            ZoomRequest::Reset => (
                base.rows.mapper.unzoom(),
                base.cols.mapper.unzoom(),
                base.rows.gaps.clone(),
                base.cols.gaps.clone(),
                false,
            ),
        };
        tracing::debug!(rows = rows.size(), cols = cols.size(), zoomed, "zoom");
        Self::view(Arc::clone(base), rows, cols, row_gaps, col_gaps, zoomed)
    }

    /// Ids under a visual index range of the current view.
    pub fn select(&self, range: &SelectionRange) -> Selection {
        Selection {
            row_ids: self.rows.resolve_range(range.row_start, range.row_end).to_vec(),
            col_ids: self.cols.resolve_range(range.col_start, range.col_end).to_vec(),
        }
    }

    /// Ids of every cell touched by a pixel rectangle. Gaps inside the rectangle contribute
    /// nothing.
    pub fn select_pixels(&self, rect: &Rect) -> Selection {
        let row_range = self.layout.row_cells.pixel_span_to_range(rect.y, rect.bottom());
        let col_range = self.layout.col_cells.pixel_span_to_range(rect.x, rect.right());
        Selection {
            row_ids: self.rows.visual_order()[row_range].to_vec(),
            col_ids: self.cols.visual_order()[col_range].to_vec(),
        }
    }

    /// The `(row, col)` ids of the cell under a pixel.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(&Id, &Id)> {
        let (row, col) = self.layout.cell_at(x, y)?;
        Some((&self.rows.visual_order()[row], &self.cols.visual_order()[col]))
    }

    pub fn rows(&self) -> &IdMapper {
        &self.rows
    }

    pub fn cols(&self) -> &IdMapper {
        &self.cols
    }

    pub fn layout(&self) -> &LayoutSpec {
        &self.layout
    }

    pub fn dendrograms(&self) -> &[DendrogramSpec] {
        &self.dendrograms
    }

    pub fn tracks(&self) -> &[TrackSpec] {
        &self.tracks
    }

    pub fn labels(&self, axis: Axis) -> &[LabelSpec] {
        match axis {
            Axis::Row => &self.row_labels,
            Axis::Col => &self.col_labels,
        }
    }

    pub fn options(&self) -> &FigureOptions {
        &self.base.options
    }

    pub fn cluster_results(&self, axis: Axis) -> Option<&IndexMap<String, Arc<ClusterResult<Id>>>> {
        self.base.axis(axis).clusters.as_ref()
    }

    pub fn is_zoomed(&self) -> bool {
        self.rows.is_zoomed() || self.cols.is_zoomed()
    }

    /// The matrix restricted to the current view, in visual order.
    pub fn values(&self) -> Result<NumericMatrix> {
        Ok(self
            .base
            .matrix
            .slice(self.rows.visual_order(), self.cols.visual_order())?)
    }

    /// Everything a renderer needs, borrowed from the figure.
    pub fn spec(&self) -> FigureSpec<'_> {
        FigureSpec {
            title: self.base.options.title.as_deref(),
            row_mapper: self.rows.to_state(),
            col_mapper: self.cols.to_state(),
            layout: &self.layout,
            dendrograms: &self.dendrograms,
            annotations: &self.tracks,
            row_labels: LabelSet {
                side: self.base.rows.label_side,
                labels: &self.row_labels,
            },
            col_labels: LabelSet {
                side: self.base.cols.label_side,
                labels: &self.col_labels,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelSet<'a> {
    pub side: Edge,
    pub labels: &'a [LabelSpec],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureSpec<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    pub row_mapper: MapperState,
    pub col_mapper: MapperState,
    pub layout: &'a LayoutSpec,
    #[serde(skip_serializing_if = "is_empty")]
    pub dendrograms: &'a [DendrogramSpec],
    #[serde(skip_serializing_if = "is_empty")]
    pub annotations: &'a [TrackSpec],
    pub row_labels: LabelSet<'a>,
    pub col_labels: LabelSet<'a>,
}

fn is_empty<T>(v: &&[T]) -> bool {
    v.is_empty()
}

/// Several figures concatenated along one direction.
#[derive(Debug, Clone)]
pub struct FigureGroup {
    pub layout: CompositeLayout,
    /// Maps the concatenated axis (columns when horizontal, rows when vertical) back to panels.
    pub mapper: CompositeIdMapper,
}

pub fn concat(figures: &[Figure], direction: Direction, panel_gap: f64) -> FigureGroup {
    let panels: Vec<LayoutSpec> = figures.iter().map(|f| f.layout.clone()).collect();
    let mappers: Vec<IdMapper> = figures
        .iter()
        .map(|f| match direction {
            Direction::Horizontal => f.cols.clone(),
            Direction::Vertical => f.rows.clone(),
        })
        .collect();
    let layout = match direction {
        Direction::Horizontal => CompositeLayout::horizontal(panels, panel_gap),
        Direction::Vertical => CompositeLayout::vertical(panels, panel_gap),
    };
    FigureGroup {
        layout,
        mapper: CompositeIdMapper::new(mappers, direction),
    }
}
