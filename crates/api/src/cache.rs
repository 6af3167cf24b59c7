use dashmap::DashMap;
use query_extract::ExtractionResult;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Parsed queries keyed by a hash of the raw query text.
pub struct ParseCache {
    results: DashMap<String, ExtractionResult>,
    max_entries: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ParseCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            results: DashMap::new(),
            max_entries,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, query: &str) -> Option<ExtractionResult> {
        let hit = self
            .results
            .get(&Self::key(query))
            .map(|entry| entry.value().clone());
        let counter = if hit.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        hit
    }

    pub fn insert(&self, query: &str, result: ExtractionResult) {
        if self.max_entries == 0 {
            return;
        }
        if self.results.len() >= self.max_entries {
            // Drop a quarter of the entries when full
            let evict: Vec<_> = self
                .results
                .iter()
                .take((self.max_entries / 4).max(1))
                .map(|entry| entry.key().clone())
                .collect();
            for key in evict {
                self.results.remove(&key);
            }
        }
        self.results.insert(Self::key(query), result);
    }

    fn key(query: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.results.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}
