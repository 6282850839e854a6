//! The identifier mapper: which original id sits at which visual index.
//!
//! Screen position and data identity diverge as soon as an axis is split, clustered or zoomed.
//! [`IdMapper`] is the single source of truth for that mapping. It is an immutable value; every
//! transform returns a new mapper or an error.
//!
//! Invariants held by every mapper:
//! - ids are unique;
//! - the visible groups, concatenated, equal the visual order;
//! - every gap position is strictly between `0` and `size`.

use crate::error::{Error, Result};
use crate::id::Id;
use crate::split::check_assignments;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::hash::Hash;
use std::ops::Range;
use std::sync::Arc;

/// Name of the single group created by [`IdMapper::from_ids`].
pub const DEFAULT_GROUP: &str = "__all__";

/// A named, contiguous slice of the visual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitGroup {
    pub name: String,
    pub ids: Vec<Id>,
}

impl SplitGroup {
    pub fn new(name: impl Into<String>, ids: Vec<Id>) -> Self {
        Self {
            name: name.into(),
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Where a group sits on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpan<'a> {
    pub name: &'a str,
    pub start: usize,
    pub len: usize,
}

impl GroupSpan<'_> {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// Serialized form handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapperState {
    pub visual_order: Vec<Id>,
    pub gap_positions: Vec<usize>,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdMapper {
    visual_order: Vec<Id>,
    index: FxHashMap<Id, usize>,
    gap_positions: BTreeSet<usize>,
    groups: Vec<SplitGroup>,
    /// Group membership before any zoom; what [`IdMapper::unzoom`] restores.
    retained: Arc<Vec<SplitGroup>>,
    zoomed: bool,
}

impl IdMapper {
    /// One implicit group holding every id in input order.
    pub fn from_ids<I, T>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        let visual_order: Vec<Id> = ids.into_iter().map(Into::into).collect();
        if visual_order.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut index = FxHashMap::default();
        index.reserve(visual_order.len());
        for (i, id) in visual_order.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(Error::DuplicateIdentifier { id: id.clone() });
            }
        }
        let groups = vec![SplitGroup::new(DEFAULT_GROUP, visual_order.clone())];
        Ok(Self {
            visual_order,
            index,
            gap_positions: BTreeSet::new(),
            retained: Arc::new(groups.clone()),
            groups,
            zoomed: false,
        })
    }

    fn assemble(
        visual_order: Vec<Id>,
        gap_positions: BTreeSet<usize>,
        groups: Vec<SplitGroup>,
        retained: Arc<Vec<SplitGroup>>,
        zoomed: bool,
    ) -> Self {
        let index = visual_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let out = Self {
            visual_order,
            index,
            gap_positions,
            groups,
            retained,
            zoomed,
        };
        debug_assert!(out.check_invariants());
        out
    }

    /// A non-zoomed mapper whose groups are also its retained groups.
    fn based(
        visual_order: Vec<Id>,
        gap_positions: BTreeSet<usize>,
        groups: Vec<SplitGroup>,
    ) -> Self {
        let retained = Arc::new(groups.clone());
        Self::assemble(visual_order, gap_positions, groups, retained, false)
    }

    /// Same zoom state as `self`: a zoomed mapper keeps its retained groups, anything else is a
    /// new base.
    fn derived(
        &self,
        visual_order: Vec<Id>,
        gap_positions: BTreeSet<usize>,
        groups: Vec<SplitGroup>,
    ) -> Self {
        if self.zoomed {
            Self::assemble(visual_order, gap_positions, groups, Arc::clone(&self.retained), true)
        } else {
            Self::based(visual_order, gap_positions, groups)
        }
    }

    pub fn size(&self) -> usize {
        self.visual_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visual_order.is_empty()
    }

    pub fn visual_order(&self) -> &[Id] {
        &self.visual_order
    }

    pub fn gap_positions(&self) -> &BTreeSet<usize> {
        &self.gap_positions
    }

    /// Groups partitioning the visible order.
    pub fn groups(&self) -> &[SplitGroup] {
        &self.groups
    }

    /// Full group membership as it was before the current zoom.
    pub fn retained_groups(&self) -> &[SplitGroup] {
        &self.retained
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn group_spans(&self) -> impl Iterator<Item = GroupSpan<'_>> + '_ {
        let mut start = 0;
        self.groups.iter().map(move |g| {
            let span = GroupSpan {
                name: &g.name,
                start,
                len: g.len(),
            };
            start += g.len();
            span
        })
    }

    pub fn visual_index_of<Q>(&self, id: &Q) -> Option<usize>
    where
        Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(id).copied()
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(id)
    }

    pub fn id_set(&self) -> FxHashSet<Id> {
        self.visual_order.iter().cloned().collect()
    }

    /// `[start, end)` clamped to `[0, size]`; the window `resolve_range` and `apply_zoom` use.
    pub fn clamp_range(&self, start: i64, end: i64) -> Range<usize> {
        let n = self.size() as i64;
        let s = start.clamp(0, n) as usize;
        let e = end.clamp(0, n) as usize;
        s..e.max(s)
    }

    /// Ids whose visual index lies in `[start, end)` after clamping to `[0, size]`.
    ///
    /// Gaps hold no ids, so a range spanning a gap returns both sides with nothing skipped.
    pub fn resolve_range(&self, start: i64, end: i64) -> &[Id] {
        &self.visual_order[self.clamp_range(start, end)]
    }

    /// Replaces the whole order. Groups keep their names and sizes and are re-sliced from the new
    /// order, so existing gap positions stay at group boundaries. A zoomed mapper stays zoomed and
    /// still unzooms to its retained groups.
    pub fn apply_reorder(&self, new_order: &[Id]) -> Result<Self> {
        if !is_permutation_of(new_order, self.size(), |id| self.contains(id)) {
            return Err(Error::NotAPermutation { group: None });
        }
        let mut groups = Vec::with_capacity(self.groups.len());
        for span in self.group_spans() {
            groups.push(SplitGroup::new(span.name, new_order[span.range()].to_vec()));
        }
        tracing::trace!(size = self.size(), "reordered mapper");
        Ok(self.derived(new_order.to_vec(), self.gap_positions.clone(), groups))
    }

    /// Partitions the ids into named groups with a gap before every group but the first.
    ///
    /// Groups come out in map order; inside a group ids keep their current relative order, not
    /// the order listed in `assignments`. Empty groups are skipped. The result is a new base,
    /// even when `self` is zoomed.
    pub fn apply_splits(&self, assignments: &IndexMap<String, Vec<Id>>) -> Result<Self> {
        let group_of =
            check_assignments(assignments, &self.visual_order, |id| self.contains(id))?;

        let mut buckets: Vec<Vec<Id>> = assignments
            .values()
            .map(|ids| Vec::with_capacity(ids.len()))
            .collect();
        for id in &self.visual_order {
            if let Some(&g) = group_of.get(id) {
                buckets[g].push(id.clone());
            }
        }

        let mut visual_order = Vec::with_capacity(self.size());
        let mut gaps = BTreeSet::new();
        let mut groups = Vec::with_capacity(buckets.len());
        for (name, ids) in assignments.keys().zip(buckets) {
            if ids.is_empty() {
                continue;
            }
            if !visual_order.is_empty() {
                gaps.insert(visual_order.len());
            }
            visual_order.extend(ids.iter().cloned());
            groups.push(SplitGroup::new(name.clone(), ids));
        }
        tracing::debug!(groups = groups.len(), size = visual_order.len(), "split mapper");
        Ok(Self::based(visual_order, gaps, groups))
    }

    /// Replaces the order inside each named group; other groups and all gaps stay as they are.
    /// Names that match no group are ignored. Zoom state is kept as in [`IdMapper::apply_reorder`].
    pub fn apply_reorder_within_groups(
        &self,
        group_orders: &IndexMap<String, Vec<Id>>,
    ) -> Result<Self> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            match group_orders.get(&group.name) {
                Some(order) => {
                    let members: FxHashSet<&Id> = group.ids.iter().collect();
                    if !is_permutation_of(order, group.len(), |id| members.contains(id)) {
                        return Err(Error::NotAPermutation {
                            group: Some(group.name.clone()),
                        });
                    }
                    groups.push(SplitGroup::new(group.name.clone(), order.clone()));
                }
                None => groups.push(group.clone()),
            }
        }
        let visual_order = groups.iter().flat_map(|g| g.ids.iter().cloned()).collect();
        Ok(self.derived(visual_order, self.gap_positions.clone(), groups))
    }

    /// Narrows the view to visual indices `[start, end)` (clamped). Gaps are shifted into the new
    /// coordinates; gaps at or outside the new bounds disappear. The pre-zoom groups are retained.
    pub fn apply_zoom(&self, start: i64, end: i64) -> Result<Self> {
        let range = self.clamp_range(start, end);
        if range.is_empty() {
            return Err(Error::InvalidRange {
                start,
                end,
                size: self.size(),
            });
        }
        let gaps = self
            .gap_positions
            .iter()
            .filter(|&&g| range.start < g && g < range.end)
            .map(|&g| g - range.start)
            .collect();
        let mut groups = Vec::new();
        for span in self.group_spans() {
            let lo = span.start.max(range.start);
            let hi = (span.start + span.len).min(range.end);
            if lo < hi {
                groups.push(SplitGroup::new(
                    span.name,
                    self.visual_order[lo..hi].to_vec(),
                ));
            }
        }
        tracing::debug!(start = range.start, end = range.end, "zoomed mapper to range");
        Ok(Self::assemble(
            self.visual_order[range].to_vec(),
            gaps,
            groups,
            Arc::clone(&self.retained),
            true,
        ))
    }

    /// Narrows the view to the listed ids, keeping their current relative order. The filtered
    /// view is packed: it has no gaps.
    pub fn apply_zoom_by_ids(&self, ids: &[Id]) -> Result<Self> {
        let wanted: FxHashSet<&Id> = ids.iter().collect();
        let mut groups = Vec::new();
        for group in &self.groups {
            let kept: Vec<Id> = group
                .ids
                .iter()
                .filter(|id| wanted.contains(id))
                .cloned()
                .collect();
            if !kept.is_empty() {
                groups.push(SplitGroup::new(group.name.clone(), kept));
            }
        }
        if groups.is_empty() {
            return Err(Error::EmptyResult);
        }
        let visual_order: Vec<Id> = groups.iter().flat_map(|g| g.ids.iter().cloned()).collect();
        tracing::debug!(size = visual_order.len(), "zoomed mapper to ids");
        Ok(Self::assemble(
            visual_order,
            BTreeSet::new(),
            groups,
            Arc::clone(&self.retained),
            true,
        ))
    }

    /// The mapper this one was zoomed from: retained groups in order, a gap at every boundary.
    pub fn unzoom(&self) -> Self {
        if !self.zoomed {
            return self.clone();
        }
        let groups: Vec<SplitGroup> = self.retained.iter().cloned().collect();
        let mut visual_order = Vec::new();
        let mut gaps = BTreeSet::new();
        for group in &groups {
            if !visual_order.is_empty() {
                gaps.insert(visual_order.len());
            }
            visual_order.extend(group.ids.iter().cloned());
        }
        Self::assemble(visual_order, gaps, groups, Arc::clone(&self.retained), false)
    }

    pub fn to_state(&self) -> MapperState {
        MapperState {
            visual_order: self.visual_order.clone(),
            gap_positions: self.gap_positions.iter().copied().collect(),
            size: self.size(),
        }
    }

    pub fn check_invariants(&self) -> bool {
        let n = self.size();
        let unique = self.index.len() == n;
        let partitioned = self
            .groups
            .iter()
            .flat_map(|g| g.ids.iter())
            .eq(self.visual_order.iter());
        let interior = self.gap_positions.iter().all(|&g| 0 < g && g < n);
        unique && partitioned && interior
    }
}

fn is_permutation_of(candidate: &[Id], expected_len: usize, member: impl Fn(&Id) -> bool) -> bool {
    if candidate.len() != expected_len {
        return false;
    }
    let mut seen: FxHashSet<&Id> = FxHashSet::default();
    candidate.iter().all(|id| member(id) && seen.insert(id))
}
