// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{LayoutConfig, MAX_CACHE_DIMENSION, MAX_CACHE_SIZE};
use crate::fingerprint::fingerprint;
use crate::model::FlowBlock;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

pub const DEFAULT_NEAR_CAPACITY_THRESHOLD: f64 = 0.9;

/// Counters exposed for external telemetry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub invalidations: u64,
    pub evictions: u64,
    pub clears: u64,
    /// Current number of entries.
    pub size: usize,
    /// Approximate bytes held: key text plus the inline size of every value.
    pub memory_estimate: usize,
}

impl CacheStats {
    /// Hits over lookups, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Cache handle for hosts that lay out from several threads.
pub type SharedMeasureCache<T> = Arc<Mutex<MeasureCache<T>>>;

/// Bounded LRU store of block measurements.
///
/// Keys combine the block id, the clamped layout box and the block's
/// fingerprint, so an entry can only be returned for content that renders
/// identically. The cache never computes values itself: callers measure on
/// a miss and call [`MeasureCache::set`].
pub struct MeasureCache<T> {
    entries: LruCache<String, T>,
    stats: CacheStats,
    max_dimension: u32,
    key_bytes: usize,
}

impl<T> MeasureCache<T> {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_SIZE)
    }

    /// Creates a cache holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
            max_dimension: MAX_CACHE_DIMENSION,
            key_bytes: 0,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        let mut cache = Self::with_capacity(config.cache_capacity);
        cache.max_dimension = config.max_dimension;
        cache
    }

    pub fn shared(self) -> SharedMeasureCache<T> {
        Arc::new(Mutex::new(self))
    }

    #[inline]
    fn key_for(&self, block: &FlowBlock, width: f32, height: f32) -> Option<String> {
        let id = block.id();
        if id.is_empty() {
            return None;
        }
        Some(cache_key(
            id,
            width,
            height,
            &fingerprint(block),
            self.max_dimension,
        ))
    }

    /// Looks up a measurement, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, block: &FlowBlock, width: f32, height: f32) -> Option<&T> {
        let Some(key) = self.key_for(block, width, height) else {
            self.stats.misses += 1;
            return None;
        };

        match self.entries.get(&key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Looks up a measurement without touching recency or counters.
    pub fn peek(&self, block: &FlowBlock, width: f32, height: f32) -> Option<&T> {
        let key = self.key_for(block, width, height)?;
        self.entries.peek(&key)
    }

    pub fn contains(&self, block: &FlowBlock, width: f32, height: f32) -> bool {
        self.key_for(block, width, height)
            .is_some_and(|key| self.entries.contains(&key))
    }

    /// Stores a measurement. Blocks without an id are ignored.
    pub fn set(&mut self, block: &FlowBlock, width: f32, height: f32, value: T) {
        let Some(key) = self.key_for(block, width, height) else {
            return;
        };

        if !self.entries.contains(&key) && self.entries.len() >= self.capacity() {
            if let Some((evicted, _)) = self.entries.pop_lru() {
                self.key_bytes -= evicted.len();
                self.stats.evictions += 1;
                trace!("MeasureCache evicted {evicted}");
            }
        }

        let key_len = key.len();
        if self.entries.put(key, value).is_none() {
            self.key_bytes += key_len;
        }

        self.stats.sets += 1;
        self.refresh_size();
    }

    /// Drops every entry belonging to any of `block_ids`, at any size and
    /// fingerprint. Returns the number of entries removed.
    pub fn invalidate<I, S>(&mut self, block_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes: Vec<String> = block_ids
            .into_iter()
            .filter(|id| !id.as_ref().is_empty())
            .map(|id| format!("{}@", id.as_ref()))
            .collect();
        if prefixes.is_empty() {
            return 0;
        }

        let stale: Vec<String> = self
            .entries
            .iter()
            .map(|(key, _)| key)
            .filter(|key| prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())))
            .cloned()
            .collect();

        for key in &stale {
            if self.entries.pop(key).is_some() {
                self.key_bytes -= key.len();
            }
        }

        let removed = stale.len();
        self.stats.invalidations += removed as u64;
        self.refresh_size();
        if removed > 0 {
            debug!("MeasureCache invalidated {removed} entries");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.key_bytes = 0;
        self.stats.clears += 1;
        self.refresh_size();
        debug!("MeasureCache cleared");
    }

    /// Zeroes the activity counters, keeping size and memory figures.
    pub fn reset_stats(&mut self) {
        self.stats.hits = 0;
        self.stats.misses = 0;
        self.stats.sets = 0;
        self.stats.invalidations = 0;
        self.stats.evictions = 0;
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Whether the fill ratio reached `threshold`
    /// (see [`DEFAULT_NEAR_CAPACITY_THRESHOLD`]).
    pub fn is_near_capacity(&self, threshold: f64) -> bool {
        self.entries.len() as f64 >= self.capacity() as f64 * threshold
    }

    #[inline]
    fn refresh_size(&mut self) {
        self.stats.size = self.entries.len();
        self.stats.memory_estimate =
            self.key_bytes + self.entries.len() * std::mem::size_of::<T>();
    }
}

impl<T> Default for MeasureCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamps a layout dimension into `0..=max`; non-finite values become 0.
#[inline]
pub fn clamp_dimension(value: f32, max: u32) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.floor().clamp(0., max as f32) as u32
}

/// Builds `{block_id}@{width}x{height}:{fingerprint}`.
pub fn cache_key(
    block_id: &str,
    width: f32,
    height: f32,
    fingerprint: &str,
    max_dimension: u32,
) -> String {
    format!(
        "{block_id}@{}x{}:{fingerprint}",
        clamp_dimension(width, max_dimension),
        clamp_dimension(height, max_dimension)
    )
}
