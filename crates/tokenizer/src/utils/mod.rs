//! Utility modules for the BPE tokenizer.
//!
//! This module contains the chunk cache used while tokenizing.

pub mod cache;

pub use cache::{CacheStats, ChunkCache, DEFAULT_CACHE_CAPACITY};
