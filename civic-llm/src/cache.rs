//! Query-keyed store of previously generated explanations.
//!
//! Keys are the case-folded query string; nothing else is normalised, so
//! whitespace or punctuation differences miss. Entries live for the whole
//! process: no eviction, no size bound, no expiry. Concurrent stores of the
//! same key are last-write-wins.

use crate::model::ExplanationResult;
use dashmap::DashMap;

/// Storage seam for the query-based explain path.
pub trait ExplanationCache: Send + Sync {
    fn lookup(&self, query: &str) -> Option<ExplanationResult>;
    fn store(&self, query: &str, result: ExplanationResult);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn cache_key(query: &str) -> String {
    query.to_lowercase()
}

/// Unbounded in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryExplanationCache {
    entries: DashMap<String, ExplanationResult>,
}

impl MemoryExplanationCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExplanationCache for MemoryExplanationCache {
    fn lookup(&self, query: &str) -> Option<ExplanationResult> {
        self.entries
            .get(&cache_key(query))
            .map(|entry| entry.value().clone())
    }

    fn store(&self, query: &str, result: ExplanationResult) {
        self.entries.insert(cache_key(query), result);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
