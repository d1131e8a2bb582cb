//! ResultCache implementation.

use lumen_abstraction::ModelOutput;
use std::collections::HashMap;
use tracing::debug;

use super::types::CacheStats;

/// Unbounded mapping from raw input to a previously produced output.
///
/// Keys are used verbatim: case and surrounding whitespace matter.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, ModelOutput>,
    stats: CacheStats,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn put(&mut self, key: impl Into<String>, value: ModelOutput) {
        self.entries.insert(key.into(), value);
        self.stats.entries = self.entries.len();
    }

    /// Looks up a previously stored output and records the hit or miss.
    pub fn get(&mut self, key: &str) -> Option<ModelOutput> {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                debug!(key_len = key.len(), "Result cache hit");
                Some(value.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Whether `key` has a stored output. Does not count as a lookup.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a snapshot of the hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}
