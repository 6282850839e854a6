//! Id resolution across several heatmap panels concatenated along one axis.

use crate::id::Id;
use crate::mapper::IdMapper;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `Horizontal` panels share rows and stack their column mappers left to right; `Vertical`
/// panels share columns and stack their row mappers top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelMapping {
    pub panel_index: usize,
    /// Inclusive start in the composite order.
    pub start: usize,
    pub end: usize,
    pub mapper: IdMapper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeIdMapper {
    direction: Direction,
    panels: Vec<PanelMapping>,
    total_size: usize,
}

impl CompositeIdMapper {
    pub fn new(mappers: Vec<IdMapper>, direction: Direction) -> Self {
        let mut offset = 0;
        let panels = mappers
            .into_iter()
            .enumerate()
            .map(|(panel_index, mapper)| {
                let start = offset;
                offset += mapper.size();
                PanelMapping {
                    panel_index,
                    start,
                    end: offset,
                    mapper,
                }
            })
            .collect();
        Self {
            direction,
            panels,
            total_size: offset,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn panels(&self) -> &[PanelMapping] {
        &self.panels
    }

    /// `{panel_index: ids}` for every panel the composite range `[start, end)` overlaps.
    pub fn resolve_range(&self, start: i64, end: i64) -> IndexMap<usize, Vec<Id>> {
        let start = start.max(0);
        let end = end.min(self.total_size as i64);
        let mut out = IndexMap::new();
        for panel in &self.panels {
            let (p0, p1) = (panel.start as i64, panel.end as i64);
            if p1 <= start || p0 >= end {
                continue;
            }
            let ids = panel.mapper.resolve_range(start - p0, end - p0);
            if !ids.is_empty() {
                out.insert(panel.panel_index, ids.to_vec());
            }
        }
        out
    }

    /// Composite indices where a new panel begins.
    pub fn panel_gap_positions(&self) -> BTreeSet<usize> {
        self.panels.iter().skip(1).map(|p| p.start).collect()
    }
}
