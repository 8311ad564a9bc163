//! In-memory vector store
//!
//! Thread-safe brute-force store over a `HashMap`. Suited to tests and
//! corpora in the low tens of thousands of chunks; beyond that, swap in a
//! real ANN backend behind the same contract.

use super::{cosine_similarity, MetadataFilter, StoredDocument, VectorMatch, VectorRecord};
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory vector store using brute-force cosine scan
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorStore {
    records: Arc<RwLock<HashMap<String, VectorRecord>>>,
}

impl InMemoryVectorStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn from_records(records: HashMap<String, VectorRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub(super) fn snapshot(&self) -> HashMap<String, VectorRecord> {
        self.records.read().clone()
    }
}

#[async_trait]
impl super::VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        let mut map = self.records.write();
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        n_results: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>> {
        let mut scored: Vec<VectorMatch> = {
            let records = self.records.read();
            records
                .values()
                .filter(|record| filter.is_none_or(|f| f.matches(&record.metadata)))
                .map(|record| VectorMatch {
                    id: record.id.clone(),
                    distance: 1.0 - cosine_similarity(vector, &record.embedding),
                })
                .collect()
        };

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(n_results);
        Ok(scored)
    }

    async fn get(&self, ids: Option<&[String]>) -> Result<Vec<StoredDocument>> {
        let records = self.records.read();
        let documents = match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| records.get(id))
                .map(to_document)
                .collect(),
            None => records.values().map(to_document).collect(),
        };
        Ok(documents)
    }

    async fn delete(&self, filter: Option<&MetadataFilter>) -> Result<usize> {
        let mut records = self.records.write();
        let before = records.len();
        match filter {
            Some(filter) => records.retain(|_, record| !filter.matches(&record.metadata)),
            None => records.clear(),
        }
        Ok(before - records.len())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }
}

fn to_document(record: &VectorRecord) -> StoredDocument {
    StoredDocument {
        id: record.id.clone(),
        document: record.document.clone(),
        metadata: record.metadata.clone(),
    }
}
