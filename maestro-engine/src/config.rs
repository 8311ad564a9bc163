//! Engine configuration
//!
//! A single TOML document with recognised keys for skill roots, the vector
//! store location, provider selection, and pipeline tuning. Paths are
//! carried in the config value — never read from globals.

use crate::error::{EngineError, Result};
use maestro_rag::embeddings::{EmbeddingConfig, EmbeddingProviderKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaestroConfig {
    /// Directories scanned for skill directories
    pub skill_paths: Vec<PathBuf>,
    /// Directory for the persistent vector store
    pub vectordb_path: PathBuf,
    /// Which embedding provider to use
    pub embedding_provider: EmbeddingProviderKind,
    /// Model for the local provider
    pub local_model: String,
    /// Model for the remote provider
    pub remote_model: String,
    /// Whether cross-encoder reranking runs when a reranker is available
    pub reranker_enabled: bool,
    /// Candidate pool size fed to the reranker
    pub reranker_candidates: usize,
    /// Default number of results returned by a search
    pub top_k: usize,
    /// Minimum relevance; recognised for config compatibility, not applied
    /// by the pipeline
    pub min_relevance: f32,
    /// Token window size for chunking
    pub chunk_max_tokens: usize,
    /// Whether the query cache is consulted and populated
    pub cache_enabled: bool,
    /// Cosine similarity at which a cached query counts as a semantic hit
    pub cache_similarity: f32,
}

impl Default for MaestroConfig {
    fn default() -> Self {
        Self {
            skill_paths: vec![PathBuf::from("skills")],
            vectordb_path: PathBuf::from("vectordb"),
            embedding_provider: EmbeddingProviderKind::Local,
            local_model: "all-MiniLM-L6-v2".to_string(),
            remote_model: "voyage-code-3".to_string(),
            reranker_enabled: true,
            reranker_candidates: 20,
            top_k: 7,
            min_relevance: 0.15,
            chunk_max_tokens: 400,
            cache_enabled: true,
            cache_similarity: 0.92,
        }
    }
}

impl MaestroConfig {
    /// Load the configuration from a TOML file
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// a hard error the caller should report and exit on.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` when the file exists but cannot be
    /// read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| EngineError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Path of the index-meta document, next to the vector store directory
    #[must_use]
    pub fn index_meta_path(&self) -> PathBuf {
        self.vectordb_path
            .parent()
            .map_or_else(|| PathBuf::from("index_meta.json"), Path::to_path_buf)
            .join("index_meta.json")
    }

    /// Derive the embedding provider configuration
    #[must_use]
    pub fn embedding_config(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: self.embedding_provider,
            local_model: self.local_model.clone(),
            remote_model: self.remote_model.clone(),
            ..EmbeddingConfig::default()
        }
    }
}
