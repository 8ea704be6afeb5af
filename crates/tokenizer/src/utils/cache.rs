//! Chunk cache for repeated sub-words.
//!
//! This module provides an LRU cache mapping raw scanner chunks to their merged
//! symbols, so that a word repeated within (or across) inputs is only merged once.

use crate::{Result, TokenizerError};
use ahash::AHashMap;
use bbpe_core::SymbolList;
use compact_str::CompactString;
use std::collections::VecDeque;

/// Default number of chunks kept per cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// LRU cache for merge results.
///
/// Recency is tracked in a queue with the most recently used key at the back. Both
/// lookups that hit and inserts move a key to the back; an insert into a full cache
/// evicts the front.
#[derive(Debug, Clone)]
pub struct ChunkCache {
    /// The cache storing chunk -> merged symbols
    cache: AHashMap<CompactString, SymbolList>,
    /// Maximum number of entries in the cache
    capacity: usize,
    /// Keys ordered from least to most recently used
    recency: VecDeque<CompactString>,
    hits: u64,
    misses: u64,
}

impl ChunkCache {
    /// Create a cache holding at most `capacity` chunks.
    ///
    /// # Errors
    /// Returns [`TokenizerError::InvalidConfig`] when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TokenizerError::InvalidConfig(
                "cache capacity must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            cache: AHashMap::with_capacity(capacity),
            capacity,
            recency: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        })
    }

    /// Check whether `key` is cached, refreshing its recency on a hit.
    ///
    /// Every call counts as either a hit or a miss in [`CacheStats`].
    pub fn already_tokenized(&mut self, key: &str) -> bool {
        if self.cache.contains_key(key) {
            self.touch(key);
            self.hits += 1;
            true
        } else {
            self.misses += 1;
            false
        }
    }

    /// Get the cached symbols for `key`.
    ///
    /// # Errors
    /// Returns [`TokenizerError::InternalInvariant`] if `key` is not cached; callers are
    /// expected to check [`already_tokenized`](Self::already_tokenized) first.
    pub fn get_output(&self, key: &str) -> Result<&SymbolList> {
        self.cache.get(key).ok_or_else(|| {
            TokenizerError::InternalInvariant(format!("chunk {:?} is not cached", key))
        })
    }

    /// Insert a merge result, evicting the least recently used entry when full.
    pub fn add(&mut self, key: &str, value: SymbolList) {
        if self.cache.contains_key(key) {
            self.touch(key);
        } else {
            if self.cache.len() >= self.capacity {
                if let Some(oldest) = self.recency.pop_front() {
                    self.cache.remove(&oldest);
                }
            }
            self.recency.push_back(CompactString::new(key));
        }

        self.cache.insert(CompactString::new(key), value);
    }

    /// Move `key` to the most recently used position.
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k.as_str() == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }

    /// Clear all entries and counters.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.recency.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get the cache capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self {
            cache: AHashMap::with_capacity(DEFAULT_CACHE_CAPACITY),
            capacity: DEFAULT_CACHE_CAPACITY,
            recency: VecDeque::with_capacity(DEFAULT_CACHE_CAPACITY),
            hits: 0,
            misses: 0,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required merging the chunk
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbpe_core::Symbol;

    fn symbols(id: u32) -> SymbolList {
        vec![Symbol::new(id, 1)]
    }

    #[test]
    fn test_cache_hit_miss() {
        let mut cache = ChunkCache::with_capacity(3).unwrap();

        assert!(!cache.already_tokenized("hello"));
        cache.add("hello", symbols(1));
        assert!(cache.already_tokenized("hello"));
        assert_eq!(cache.get_output("hello").unwrap(), &symbols(1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), Some(0.5));
    }

    #[test]
    fn test_get_output_on_miss_is_an_error() {
        let cache = ChunkCache::default();
        assert!(matches!(
            cache.get_output("nope"),
            Err(TokenizerError::InternalInvariant(_))
        ));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = ChunkCache::with_capacity(2).unwrap();

        cache.add("a", symbols(1));
        cache.add("b", symbols(2));
        cache.add("c", symbols(3));

        // "a" should have been evicted (oldest)
        assert!(cache.get_output("a").is_err());
        assert!(cache.get_output("b").is_ok());
        assert!(cache.get_output("c").is_ok());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lru_update() {
        let mut cache = ChunkCache::with_capacity(2).unwrap();

        cache.add("a", symbols(1));
        cache.add("b", symbols(2));

        // Access "a" to make it recently used
        assert!(cache.already_tokenized("a"));

        // Add "c" - should evict "b" not "a"
        cache.add("c", symbols(3));

        assert!(cache.get_output("a").is_ok());
        assert!(cache.get_output("b").is_err());
        assert!(cache.get_output("c").is_ok());
    }

    #[test]
    fn test_re_adding_refreshes_without_evicting() {
        let mut cache = ChunkCache::with_capacity(2).unwrap();

        cache.add("a", symbols(1));
        cache.add("b", symbols(2));
        cache.add("a", symbols(4));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_output("a").unwrap(), &symbols(4));

        cache.add("c", symbols(3));
        assert!(cache.get_output("b").is_err());
        assert!(cache.get_output("a").is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            ChunkCache::with_capacity(0),
            Err(TokenizerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_clear() {
        let mut cache = ChunkCache::default();
        cache.add("hello", symbols(1));
        cache.already_tokenized("hello");

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
