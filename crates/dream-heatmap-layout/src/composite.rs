use crate::composer::LayoutSpec;
use dream_heatmap_core::Direction;
use serde::Serialize;

pub const DEFAULT_PANEL_GAP: f64 = 20.0;

/// Several panel layouts placed side by side or stacked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeLayout {
    pub panels: Vec<LayoutSpec>,
    pub total_width: f64,
    pub total_height: f64,
    pub direction: Direction,
    pub panel_gap: f64,
}

impl CompositeLayout {
    /// Left to right; the composite is as tall as the tallest panel.
    pub fn horizontal(panels: Vec<LayoutSpec>, panel_gap: f64) -> Self {
        let total_height = panels.iter().map(|p| p.total_height).fold(0.0, f64::max);
        let total_width = panels.iter().map(|p| p.total_width).sum::<f64>()
            + panel_gap * panels.len().saturating_sub(1) as f64;
        Self {
            panels,
            total_width,
            total_height,
            direction: Direction::Horizontal,
            panel_gap,
        }
    }

    /// Top to bottom; the composite is as wide as the widest panel.
    pub fn vertical(panels: Vec<LayoutSpec>, panel_gap: f64) -> Self {
        let total_width = panels.iter().map(|p| p.total_width).fold(0.0, f64::max);
        let total_height = panels.iter().map(|p| p.total_height).sum::<f64>()
            + panel_gap * panels.len().saturating_sub(1) as f64;
        Self {
            panels,
            total_width,
            total_height,
            direction: Direction::Vertical,
            panel_gap,
        }
    }

    /// Top-left corner of every panel in composite coordinates.
    pub fn panel_origins(&self) -> Vec<(f64, f64)> {
        let mut cursor = 0.0;
        self.panels
            .iter()
            .map(|p| {
                let origin = match self.direction {
                    Direction::Horizontal => (cursor, 0.0),
                    Direction::Vertical => (0.0, cursor),
                };
                cursor += self.panel_gap
                    + match self.direction {
                        Direction::Horizontal => p.total_width,
                        Direction::Vertical => p.total_height,
                    };
                origin
            })
            .collect()
    }
}
