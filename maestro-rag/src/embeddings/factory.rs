//! Embedding provider selection

use super::{EmbeddingProvider, LocalEmbedding, RemoteEmbedding};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Supported embedding provider kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Local model runtime (default)
    #[default]
    Local,
    /// Hosted embeddings API
    Remote,
}

/// Configuration for creating an embedding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Which provider kind to create
    pub provider: EmbeddingProviderKind,
    /// Model for the local provider
    pub local_model: String,
    /// Model for the remote provider
    pub remote_model: String,
    /// Vector dimensionality
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Local,
            local_model: "all-MiniLM-L6-v2".to_string(),
            remote_model: "voyage-code-3".to_string(),
            dimensions: 384,
        }
    }
}

/// Create the embedding provider described by the configuration
///
/// # Errors
///
/// Returns `RagError::Embedding` when the remote provider is selected and
/// its API key is not available.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    Ok(match config.provider {
        EmbeddingProviderKind::Local => Arc::new(LocalEmbedding::new(
            config.local_model.clone(),
            config.dimensions,
        )),
        EmbeddingProviderKind::Remote => Arc::new(RemoteEmbedding::new(
            config.remote_model.clone(),
            config.dimensions,
        )?),
    })
}
