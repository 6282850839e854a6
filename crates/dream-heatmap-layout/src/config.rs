use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the composer picks the cell size of each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CellSizing {
    /// Largest cell that fits the axis budget.
    #[default]
    BudgetFit,
    /// Like `BudgetFit`, but never larger than the target, so small matrices stop growing at a
    /// comfortable on-screen size.
    AutoTarget {
        #[serde(rename = "targetCellSize", default = "default_target_cell_size")]
        target_cell_size: f64,
    },
}

fn default_target_cell_size() -> f64 {
    20.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Used for an axis with no cells.
    pub cell_size: f64,
    pub gap_size: f64,
    pub padding: f64,
    pub dendrogram_extent: f64,
    pub min_cell_size: f64,
    pub max_cell_size: f64,
    pub max_width: f64,
    pub max_height: f64,
    pub legend_gap: f64,
    pub legend_margin: f64,
    pub title_height: f64,
    pub primary_gap: f64,
    pub secondary_gap: f64,
    pub label_font_size: f64,
    pub sizing: CellSizing,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size: 12.0,
            gap_size: 6.0,
            padding: 40.0,
            dendrogram_extent: 80.0,
            min_cell_size: 0.05,
            max_cell_size: 50.0,
            max_width: 1000.0,
            max_height: 500.0,
            legend_gap: 15.0,
            legend_margin: 5.0,
            title_height: 28.0,
            primary_gap: 8.0,
            secondary_gap: 3.0,
            label_font_size: 10.0,
            sizing: CellSizing::BudgetFit,
        }
    }
}

impl LayoutConfig {
    /// Defaults with `overrides` deep-merged on top: objects merge key by key, anything else
    /// replaces.
    pub fn from_overrides(overrides: &Value) -> Result<Self> {
        let mut base = serde_json::to_value(Self::default())?;
        deep_merge_value(&mut base, overrides);
        Ok(serde_json::from_value(base)?)
    }

    pub fn clamp_cell(&self, size: f64) -> f64 {
        size.min(self.max_cell_size).max(self.min_cell_size)
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
