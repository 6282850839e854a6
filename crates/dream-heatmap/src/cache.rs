//! A bounded cache of cluster results, owned by the caller.
//!
//! Re-clustering is the expensive part of rebuilding a figure. The cache remembers the last
//! [`DEFAULT_CAPACITY`] results and evicts the least recently used one when full. Entries are
//! keyed on the exact group membership (in order), the clustering options and a digest of the
//! sub-matrix values, so a change to any of them misses.

use dream_heatmap_core::{ClusterOptions, ClusterResult, Clusterer, DirectClusterer, Id, Result};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use rustc_hash::{FxBuildHasher, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    members: Vec<Id>,
    options: ClusterOptions,
    shape: (usize, usize),
    values: u64,
}

impl CacheKey {
    fn new(data: &DMatrix<f64>, ids: &[Id], options: &ClusterOptions) -> Self {
        let mut hasher = FxHasher::default();
        for value in data.iter() {
            value.to_bits().hash(&mut hasher);
        }
        Self {
            members: ids.to_vec(),
            options: *options,
            shape: data.shape(),
            values: hasher.finish(),
        }
    }
}

/// LRU cache in front of [`DirectClusterer`]. Iteration order of the map is recency order,
/// oldest first.
#[derive(Debug)]
pub struct ClusterCache {
    entries: IndexMap<CacheKey, Arc<ClusterResult<Id>>, FxBuildHasher>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for ClusterCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ClusterCache {
    /// A capacity of zero disables caching; every request is computed.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drops every entry. Hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Clusterer for ClusterCache {
    fn cluster(
        &mut self,
        data: &DMatrix<f64>,
        ids: &[Id],
        options: &ClusterOptions,
    ) -> Result<Arc<ClusterResult<Id>>> {
        let key = CacheKey::new(data, ids, options);
        if let Some(index) = self.entries.get_index_of(&key) {
            let newest = self.entries.len() - 1;
            self.entries.move_index(index, newest);
            if let Some((_, result)) = self.entries.get_index(newest) {
                self.hits += 1;
                tracing::trace!(items = ids.len(), hits = self.hits, "cluster cache hit");
                return Ok(Arc::clone(result));
            }
        }

        self.misses += 1;
        tracing::debug!(
            items = ids.len(),
            method = %options.method,
            metric = %options.metric,
            misses = self.misses,
            "cluster cache miss"
        );
        let result = DirectClusterer.cluster(data, ids, options)?;
        if self.capacity == 0 {
            return Ok(result);
        }
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
            tracing::trace!(capacity = self.capacity, "evicted least recently used cluster result");
        }
        self.entries.insert(key, Arc::clone(&result));
        Ok(result)
    }
}
