//! Bounded parse cache
//!
//! An LRU keyed by trimmed source text, shared behind an `Arc` by every
//! evaluator that enables caching. Both successful parses and syntax errors
//! are cached: a template that keeps feeding the same broken expression
//! should not pay the full parse cost on every node execution.
//!
//! Entries are `Arc<ParsedExpression>` and immutable after publication, so
//! readers clone the handle and never lock anything afterwards.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use super::error::ParseError;
use super::ParsedExpression;

/// Outcome stored per source string
pub type CachedParse = Result<Arc<ParsedExpression>, ParseError>;

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that had to parse
    pub misses: u64,
    /// Entries currently held
    pub entries: usize,
    /// Configured capacity
    pub capacity: usize,
}

impl CacheStats {
    /// Hit ratio in 0..=1, zero when nothing was looked up yet
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded, thread-safe parse cache.
pub struct ParseCache {
    entries: Mutex<LruCache<String, CachedParse>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ParseCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).expect("capacity clamped to >= 1"),
            )),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up `source`, parsing and inserting on miss.
    ///
    /// The parse itself runs outside the lock; under concurrent misses for
    /// the same source the last writer wins, which is harmless because
    /// identical input parses to identical results.
    pub fn get_or_parse<F>(&self, source: &str, parse: F) -> CachedParse
    where
        F: FnOnce(&str) -> Result<ParsedExpression, ParseError>,
    {
        if let Some(cached) = self.entries.lock().get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("parse cache hit: {source:?}");
            return cached.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let outcome = parse(source).map(Arc::new);
        self.entries
            .lock()
            .put(source.to_string(), outcome.clone());
        outcome
    }

    /// Drop every entry (counters are kept).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
            capacity: self.capacity,
        }
    }
}

impl std::fmt::Debug for ParseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("ParseCache")
            .field("entries", &stats.entries)
            .field("capacity", &stats.capacity)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source_to_parsed;

    #[test]
    fn test_hit_after_miss() {
        let cache = ParseCache::new(16);
        let first = cache.get_or_parse("1 + 2", parse_source_to_parsed).unwrap();
        let second = cache.get_or_parse("1 + 2", parse_source_to_parsed).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_failed_parses_are_cached() {
        let cache = ParseCache::new(16);
        assert!(cache.get_or_parse("1 +", parse_source_to_parsed).is_err());
        assert!(cache.get_or_parse("1 +", parse_source_to_parsed).is_err());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ParseCache::new(2);
        cache.get_or_parse("1", parse_source_to_parsed).unwrap();
        cache.get_or_parse("2", parse_source_to_parsed).unwrap();
        cache.get_or_parse("3", parse_source_to_parsed).unwrap();
        assert_eq!(cache.stats().entries, 2);

        // "1" was least recently used and is gone; "3" is still warm
        cache.get_or_parse("3", parse_source_to_parsed).unwrap();
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_clear() {
        let cache = ParseCache::new(4);
        cache.get_or_parse("1", parse_source_to_parsed).unwrap();
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
