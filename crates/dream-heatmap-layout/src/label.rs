use crate::cell::CellLayout;
use crate::geometry::Edge;
use crate::text::{TextMeasurer, TextStyle};
use crate::{Error, Result};
use dream_heatmap_core::Id;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;
use std::str::FromStr;

/// Extra room beyond the widest label.
const LABEL_MARGIN: f64 = 10.0;

pub type LabelSide = Edge;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    All,
    None,
    /// Greedy collision skipping.
    #[default]
    Auto,
}

impl LabelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelMode::All => "all",
            LabelMode::None => "none",
            LabelMode::Auto => "auto",
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(LabelMode::All),
            "none" => Ok(LabelMode::None),
            "auto" => Ok(LabelMode::Auto),
            other => Err(Error::UnknownLabelMode {
                mode: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSpec {
    pub text: String,
    /// Cell center on the label axis.
    pub position: f64,
    pub visible: bool,
    pub font_size: f64,
}

/// Labels for `ids` (visual order) at their cell centers.
///
/// In `Auto` mode a label is shown only when its center is at least `min_spacing` (default
/// `font_size * 1.2`) past the last shown one; a single left-to-right pass.
pub fn compute_labels(
    ids: &[Id],
    cells: &CellLayout,
    mode: LabelMode,
    font_size: f64,
    min_spacing: Option<f64>,
) -> Vec<LabelSpec> {
    if mode == LabelMode::None {
        return Vec::new();
    }
    let min_spacing = min_spacing.unwrap_or(font_size * 1.2);
    let mut last_shown = f64::NEG_INFINITY;
    ids.iter()
        .zip(cells.positions())
        .map(|(id, start)| {
            let position = start + cells.cell_size() / 2.0;
            let visible = match mode {
                LabelMode::Auto => position - last_shown >= min_spacing,
                _ => true,
            };
            if visible {
                last_shown = position;
            }
            LabelSpec {
                text: id.to_string(),
                position,
                visible,
                font_size,
            }
        })
        .collect()
}

fn widest(ids: &[Id], measurer: &dyn TextMeasurer, style: &TextStyle) -> Option<f64> {
    ids.iter()
        .map(|id| measurer.measure_width(id.as_str(), style))
        .reduce(f64::max)
}

/// Horizontal room for row labels.
pub fn estimate_row_label_extent(
    ids: &[Id],
    mode: LabelMode,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
) -> f64 {
    if mode == LabelMode::None {
        return 0.0;
    }
    widest(ids, measurer, style).map_or(0.0, |w| w + LABEL_MARGIN)
}

/// Vertical room for column labels drawn at 45 degrees.
pub fn estimate_col_label_extent(
    ids: &[Id],
    mode: LabelMode,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
) -> f64 {
    if mode == LabelMode::None {
        return 0.0;
    }
    widest(ids, measurer, style).map_or(0.0, |w| w * FRAC_1_SQRT_2 + LABEL_MARGIN)
}
