//! Filesystem-persisted vector store
//!
//! The in-memory store plus JSON persistence under a directory the caller
//! owns. Records are loaded once at open and rewritten after every
//! mutation via a temp-file rename, so a crash mid-write leaves the
//! previous snapshot intact.

use super::memory::InMemoryVectorStore;
use super::{MetadataFilter, StoredDocument, VectorMatch, VectorRecord, VectorStore};
use crate::error::{RagError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the persisted record map
const RECORDS_FILE: &str = "records.json";

/// Vector store persisted as JSON under a data directory
#[derive(Debug)]
pub struct FilesystemVectorStore {
    inner: InMemoryVectorStore,
    path: PathBuf,
}

impl FilesystemVectorStore {
    /// Open (or create) a store under the given directory
    ///
    /// # Errors
    ///
    /// Returns `RagError::Storage` if the directory cannot be created or an
    /// existing record file cannot be parsed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| RagError::Storage(format!("cannot create {}: {e}", dir.display())))?;

        let path = dir.join(RECORDS_FILE);
        let records: HashMap<String, VectorRecord> = if path.exists() {
            let bytes = std::fs::read(&path)
                .map_err(|e| RagError::Storage(format!("cannot read {}: {e}", path.display())))?;
            serde_json::from_slice(&bytes)
                .map_err(|e| RagError::Storage(format!("corrupt {}: {e}", path.display())))?
        } else {
            HashMap::new()
        };

        debug!(
            "opened vector store at {} with {} records",
            dir.display(),
            records.len()
        );

        Ok(Self {
            inner: InMemoryVectorStore::from_records(records),
            path,
        })
    }

    fn persist(&self) -> Result<()> {
        let snapshot = self.inner.snapshot();
        let bytes = serde_json::to_vec(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)
            .map_err(|e| RagError::Storage(format!("cannot write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| RagError::Storage(format!("cannot commit {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl VectorStore for FilesystemVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        self.inner.upsert(records).await?;
        self.persist()
    }

    async fn query(
        &self,
        vector: &[f32],
        n_results: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>> {
        self.inner.query(vector, n_results, filter).await
    }

    async fn get(&self, ids: Option<&[String]>) -> Result<Vec<StoredDocument>> {
        self.inner.get(ids).await
    }

    async fn delete(&self, filter: Option<&MetadataFilter>) -> Result<usize> {
        let count = self.inner.delete(filter).await?;
        if let Err(e) = self.persist() {
            warn!("failed to persist store after delete: {e}");
        }
        Ok(count)
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}
