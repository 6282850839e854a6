use crate::Result;
use crate::cell::CellLayout;
use crate::geometry::Edge;
use dream_heatmap_core::{Id, MetadataTable};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEFAULT_TRACK_WIDTH: f64 = 15.0;
pub const DEFAULT_TRACK_GAP: f64 = 3.0;
/// Enforced by callers; stacking below works for any count.
pub const MAX_TRACKS_PER_EDGE: usize = 3;

/// A track drawn alongside one heatmap edge. The payload is opaque to layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationTrack {
    pub name: String,
    pub track_width: f64,
    #[serde(default)]
    pub payload: Value,
}

impl AnnotationTrack {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            track_width: DEFAULT_TRACK_WIDTH,
            payload,
        }
    }

    pub fn with_width(mut self, track_width: f64) -> Self {
        self.track_width = track_width;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSpec {
    pub name: String,
    pub edge: Edge,
    /// Distance from the heatmap edge, outward.
    pub offset: f64,
    pub track_width: f64,
    pub payload: Value,
}

/// Stacks `tracks` outward from `edge`, starting one gap away from it.
pub fn compute_edge_tracks(tracks: &[AnnotationTrack], edge: Edge) -> Vec<TrackSpec> {
    let mut offset = DEFAULT_TRACK_GAP;
    tracks
        .iter()
        .map(|track| {
            let spec = TrackSpec {
                name: track.name.clone(),
                edge,
                offset,
                track_width: track.track_width,
                payload: track.payload.clone(),
            };
            offset += track.track_width + DEFAULT_TRACK_GAP;
            spec
        })
        .collect()
}

/// Space to reserve on an edge: a leading gap plus every track and its trailing gap.
pub fn total_edge_width(tracks: &[AnnotationTrack]) -> f64 {
    if tracks.is_empty() {
        return 0.0;
    }
    tracks
        .iter()
        .fold(DEFAULT_TRACK_GAP, |acc, t| acc + t.track_width + DEFAULT_TRACK_GAP)
}

/// A categorical track: each item's category label in visual order.
///
/// Ids missing from the table get an empty label.
pub fn categorical_track(
    name: impl Into<String>,
    metadata: &MetadataTable,
    column: &str,
    visual_order: &[Id],
) -> Result<AnnotationTrack> {
    let name = name.into();
    let values = metadata.column(column)?;
    let categories: Vec<String> = metadata.categories(column)?.into_keys().collect();
    let labels: Vec<String> = visual_order
        .iter()
        .map(|id| match metadata.row_of(id) {
            Some(row) => values[row].to_string(),
            None => String::new(),
        })
        .collect();
    let payload = json!({
        "type": "categorical",
        "name": name,
        "trackWidth": DEFAULT_TRACK_WIDTH,
        "cellLabels": labels,
        "categories": categories,
    });
    Ok(AnnotationTrack::new(name, payload))
}

/// A run of adjacent items sharing one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBlock {
    pub category: String,
    pub start: usize,
    pub end: usize,
    pub ids: Vec<Id>,
    pub pixel_start: f64,
    pub pixel_end: f64,
}

/// Contiguous runs of equal category. `categories[i]` labels `ids[i]`, both in visual order.
pub fn category_blocks(categories: &[String], ids: &[Id], cells: &CellLayout) -> Vec<CategoryBlock> {
    let n = categories.len().min(ids.len()).min(cells.count());
    let positions = cells.positions();
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && categories[end] == categories[start] {
            end += 1;
        }
        blocks.push(CategoryBlock {
            category: categories[start].clone(),
            start,
            end,
            ids: ids[start..end].to_vec(),
            pixel_start: positions[start],
            pixel_end: positions[end - 1] + cells.cell_size(),
        });
        start = end;
    }
    blocks
}
