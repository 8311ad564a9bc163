//! Exact and semantic query cache
//!
//! In-memory mapping from query string to a previously computed response.
//! Each entry also holds the query's embedding, so a semantic lookup costs
//! one embed of the incoming query plus a dot product per cached entry —
//! cached queries are never re-embedded.
//!
//! Entries live for the process lifetime, capped by LRU eviction; eviction
//! only ever causes recomputation, never wrong answers.

use crate::types::SearchResponse;
use maestro_rag::storage::cosine_similarity;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Maximum number of cached responses
const MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone)]
struct CacheEntry {
    response: SearchResponse,
    embedding: Vec<f32>,
    last_accessed: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    clock: u64,
}

/// Query cache with exact and semantic lookup
#[derive(Debug, Default)]
pub struct QueryCache {
    state: RwLock<CacheState>,
}

impl QueryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup by the literal query string
    #[must_use]
    pub fn get_exact(&self, query: &str) -> Option<SearchResponse> {
        let mut state = self.state.write();
        state.clock += 1;
        let clock = state.clock;
        let entry = state.entries.get_mut(query)?;
        entry.last_accessed = clock;
        trace!("cache exact hit for {query:?}");
        Some(entry.response.clone())
    }

    /// Semantic lookup: the stored response whose query embedding is most
    /// similar to `query_embedding`, if that similarity meets `threshold`
    #[must_use]
    pub fn get_semantic(&self, query_embedding: &[f32], threshold: f32) -> Option<SearchResponse> {
        let mut state = self.state.write();
        state.clock += 1;
        let clock = state.clock;

        let (best_key, best_similarity) = state
            .entries
            .iter()
            .map(|(key, entry)| (key, cosine_similarity(query_embedding, &entry.embedding)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(key, similarity)| (key.clone(), similarity))?;

        if best_similarity < threshold {
            return None;
        }

        debug!("cache semantic hit ({best_similarity:.3}) for stored query {best_key:?}");
        let entry = state.entries.get_mut(&best_key)?;
        entry.last_accessed = clock;
        Some(entry.response.clone())
    }

    /// Store a response under its literal query
    ///
    /// The stored response must carry `from_cache == false`; callers flip
    /// the flag on the returned clone, never in storage.
    pub fn insert(&self, query: &str, embedding: Vec<f32>, response: SearchResponse) {
        let mut state = self.state.write();
        state.clock += 1;
        let clock = state.clock;

        if state.entries.len() >= MAX_ENTRIES && !state.entries.contains_key(query) {
            if let Some(oldest) = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone())
            {
                state.entries.remove(&oldest);
            }
        }

        state.entries.insert(
            query.to_string(),
            CacheEntry {
                response,
                embedding,
                last_accessed: clock,
            },
        );
    }

    /// Number of cached responses
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Drop every cached response
    pub fn clear(&self) {
        self.state.write().entries.clear();
    }
}
