//! Vector store contract and adapters
//!
//! The store is keyed by chunk id and holds, per record: the embedding,
//! the document text, and a metadata map. Search is cosine over the
//! embeddings with optional metadata filtering (equality and `IN`). Any
//! approximate-nearest-neighbour store with metadata filtering satisfies
//! the contract; the adapters here are a brute-force in-memory map and a
//! JSON-file-persisted variant of it.

mod filesystem;
mod memory;

pub use filesystem::FilesystemVectorStore;
pub use memory::InMemoryVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A record to insert into the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Chunk id
    pub id: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Document text (the raw passage body)
    pub document: String,
    /// Metadata for filtering and payload reconstruction
    pub metadata: HashMap<String, Value>,
}

/// A search hit: id plus cosine distance
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    /// Chunk id
    pub id: String,
    /// Cosine distance (`1 - cosine similarity`); lower is closer
    pub distance: f32,
}

/// A stored document fetched by id
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Chunk id
    pub id: String,
    /// Document text
    pub document: String,
    /// Metadata as stored
    pub metadata: HashMap<String, Value>,
}

/// Metadata predicate for filtered queries
#[derive(Debug, Clone)]
pub enum MetadataFilter {
    /// Field equals the value
    Eq(String, Value),
    /// Field is one of the values
    In(String, Vec<Value>),
}

impl MetadataFilter {
    /// Whether a metadata map satisfies this predicate
    #[must_use]
    pub fn matches(&self, metadata: &HashMap<String, Value>) -> bool {
        match self {
            Self::Eq(key, value) => metadata.get(key) == Some(value),
            Self::In(key, values) => metadata
                .get(key)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
        }
    }
}

/// Persistent vector store contract
///
/// Owned exclusively by one engine instance; implementations are
/// thread-safe but the engine serialises indexing against search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace records by id
    ///
    /// # Errors
    ///
    /// Returns `RagError::Storage` if the write fails.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Cosine search for the `n_results` nearest records
    ///
    /// When `filter` is given, only records whose metadata satisfies it
    /// are considered.
    ///
    /// # Errors
    ///
    /// Returns `RagError::Storage` if the read fails.
    async fn query(
        &self,
        vector: &[f32],
        n_results: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>>;

    /// Fetch stored documents by id; `None` fetches every record
    ///
    /// Ids not present in the store are silently omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns `RagError::Storage` if the read fails.
    async fn get(&self, ids: Option<&[String]>) -> Result<Vec<StoredDocument>>;

    /// Remove records matching a metadata predicate; `None` removes all
    ///
    /// Returns how many records were deleted.
    ///
    /// # Errors
    ///
    /// Returns `RagError::Storage` if the write fails.
    async fn delete(&self, filter: Option<&MetadataFilter>) -> Result<usize>;

    /// Number of stored records
    ///
    /// # Errors
    ///
    /// Returns `RagError::Storage` if the read fails.
    async fn count(&self) -> Result<usize>;
}

/// Cosine similarity between two vectors of equal dimensionality
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < 1e-6); // dim mismatch
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < 1e-6); // zero vector
    }

    #[test]
    fn test_filter_eq_and_in() {
        let metadata: HashMap<String, Value> =
            [("skill".to_string(), json!("swift"))].into_iter().collect();

        assert!(MetadataFilter::Eq("skill".into(), json!("swift")).matches(&metadata));
        assert!(!MetadataFilter::Eq("skill".into(), json!("rust")).matches(&metadata));
        assert!(
            MetadataFilter::In("skill".into(), vec![json!("rust"), json!("swift")])
                .matches(&metadata)
        );
        assert!(!MetadataFilter::In("skill".into(), vec![json!("rust")]).matches(&metadata));
        assert!(!MetadataFilter::Eq("missing".into(), json!("swift")).matches(&metadata));
    }
}
