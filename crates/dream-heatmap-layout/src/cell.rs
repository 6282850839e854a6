//! Per-axis cell positions: `count` uniform cells with extra space before every gap position.

use dream_heatmap_core::{GROUP_KEY_SEPARATOR, IdMapper};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Gap width used before primary split boundaries.
pub const PRIMARY_GAP: f64 = 8.0;
/// Gap width used before secondary (second-level) split boundaries.
pub const SECONDARY_GAP: f64 = 3.0;

/// Gap widths: one default plus optional per-position overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GapSizes {
    pub default: f64,
    pub overrides: BTreeMap<usize, f64>,
}

impl Default for GapSizes {
    fn default() -> Self {
        Self::uniform(6.0)
    }
}

impl GapSizes {
    pub fn uniform(size: f64) -> Self {
        Self {
            default: size,
            overrides: BTreeMap::new(),
        }
    }

    pub fn size_at(&self, position: usize) -> f64 {
        self.overrides
            .get(&position)
            .copied()
            .unwrap_or(self.default)
    }

    pub fn total(&self, positions: &BTreeSet<usize>) -> f64 {
        positions.iter().map(|&p| self.size_at(p)).sum()
    }

    /// Two-level widths for a mapper split on `a|b` keys: `primary` where the first key token
    /// changes across a boundary, `secondary` where only later tokens change.
    pub fn tiered(mapper: &IdMapper, primary: f64, secondary: f64) -> Self {
        let mut overrides = BTreeMap::new();
        let spans: Vec<_> = mapper.group_spans().collect();
        for pair in spans.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if !mapper.gap_positions().contains(&cur.start) {
                continue;
            }
            let same_primary = primary_token(prev.name) == primary_token(cur.name);
            let width = if same_primary { secondary } else { primary };
            overrides.insert(cur.start, width);
        }
        Self {
            default: primary,
            overrides,
        }
    }

    /// Overrides shifted into the coordinate space of a zoom to `[start, end)`; positions on or
    /// outside the window edges are dropped.
    pub fn remap_for_zoom(&self, start: usize, end: usize) -> Self {
        Self {
            default: self.default,
            overrides: self
                .overrides
                .iter()
                .filter(|&(&g, _)| start < g && g < end)
                .map(|(&g, &w)| (g - start, w))
                .collect(),
        }
    }

    /// Positions whose override is narrower than the widest override.
    pub fn secondary_positions(&self) -> Vec<usize> {
        if self.overrides.len() <= 1 {
            return Vec::new();
        }
        let widest = self.overrides.values().copied().fold(f64::MIN, f64::max);
        self.overrides
            .iter()
            .filter(|&(_, &w)| w < widest)
            .map(|(&g, _)| g)
            .collect()
    }
}

fn primary_token(name: &str) -> &str {
    name.split(GROUP_KEY_SEPARATOR).next().unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLayout {
    count: usize,
    cell_size: f64,
    offset: f64,
    gap_positions: BTreeSet<usize>,
    positions: Vec<f64>,
}

impl CellLayout {
    pub fn new(
        count: usize,
        cell_size: f64,
        gap_positions: &BTreeSet<usize>,
        gaps: &GapSizes,
        offset: f64,
    ) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut current = offset;
        for i in 0..count {
            if gap_positions.contains(&i) {
                current += gaps.size_at(i);
            }
            positions.push(current);
            current += cell_size;
        }
        Self {
            count,
            cell_size,
            offset,
            gap_positions: gap_positions.clone(),
            positions,
        }
    }

    pub fn uniform(
        count: usize,
        cell_size: f64,
        gap_positions: &BTreeSet<usize>,
        gap_size: f64,
        offset: f64,
    ) -> Self {
        Self::new(
            count,
            cell_size,
            gap_positions,
            &GapSizes::uniform(gap_size),
            offset,
        )
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn gap_positions(&self) -> &BTreeSet<usize> {
        &self.gap_positions
    }

    /// Pixel start of every cell.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Span from the first cell start to the last cell end, gaps included.
    pub fn total_size(&self) -> f64 {
        match self.positions.last() {
            Some(last) => last + self.cell_size - self.offset,
            None => 0.0,
        }
    }

    /// The cell under `pixel`, or `None` in a gap or outside the grid.
    pub fn pixel_to_index(&self, pixel: f64) -> Option<usize> {
        let idx = self.positions.partition_point(|&p| p <= pixel).checked_sub(1)?;
        (pixel < self.positions[idx] + self.cell_size).then_some(idx)
    }

    pub fn cell_center(&self, index: usize) -> Option<f64> {
        self.positions
            .get(index)
            .map(|p| p + self.cell_size / 2.0)
    }

    /// Center for a fractional index, interpolated between neighbouring cell centers and
    /// clamped to the grid.
    pub fn center_at(&self, index: f64) -> f64 {
        let Some(last) = self.count.checked_sub(1) else {
            return self.offset;
        };
        let x = index.clamp(0.0, last as f64);
        let lo = x.floor() as usize;
        let hi = (lo + 1).min(last);
        let t = x - lo as f64;
        let a = self.positions[lo] + self.cell_size / 2.0;
        let b = self.positions[hi] + self.cell_size / 2.0;
        a + (b - a) * t
    }

    /// Indices of the cells touching the pixel interval between `p0` and `p1` (either order).
    pub fn pixel_span_to_range(&self, p0: f64, p1: f64) -> Range<usize> {
        let (lo, hi) = if p0 <= p1 { (p0, p1) } else { (p1, p0) };
        let start = self
            .positions
            .partition_point(|&p| p + self.cell_size <= lo);
        let end = self.positions.partition_point(|&p| p <= hi);
        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_fractional_centers_across_gaps() {
        let gaps: BTreeSet<usize> = [1].into_iter().collect();
        let layout = CellLayout::uniform(2, 10.0, &gaps, 4.0, 0.0);
        assert_eq!(layout.center_at(0.0), 5.0);
        assert_eq!(layout.center_at(1.0), 19.0);
        assert_eq!(layout.center_at(0.5), 12.0);
        assert_eq!(layout.center_at(7.0), 19.0);
    }

    #[test]
    fn secondary_positions_need_two_widths() {
        let mut gaps = GapSizes::uniform(8.0);
        gaps.overrides.insert(3, 8.0);
        assert!(gaps.secondary_positions().is_empty());
        gaps.overrides.insert(5, 3.0);
        gaps.overrides.insert(9, 8.0);
        assert_eq!(gaps.secondary_positions(), vec![5]);
    }
}
