//! Embedding provider contract

use crate::error::Result;
use async_trait::async_trait;

/// Contract for text embedding providers
///
/// Implementations map text to fixed-dimension vectors. Document and query
/// modes exist because asymmetric models encode the two differently; a
/// symmetric provider simply routes both to the same encoder.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of documents
    ///
    /// # Errors
    ///
    /// Returns `RagError::Embedding` on provider failure; callers treat
    /// this as fatal to the enclosing operation and do not retry.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query
    ///
    /// # Errors
    ///
    /// Returns `RagError::Embedding` on provider failure.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimensionality of every vector this provider produces
    fn dimensions(&self) -> usize;

    /// Model identifier, for logging and diagnostics
    fn model_id(&self) -> &str;
}
