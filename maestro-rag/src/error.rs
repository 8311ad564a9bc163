//! Error types for ingestion and storage

use thiserror::Error;

/// Result type for maestro-rag operations
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors that can occur during ingestion, embedding, or storage
#[derive(Error, Debug)]
pub enum RagError {
    /// Reading a corpus file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding provider failure (fatal to the enclosing call)
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Vector store operation failure
    #[error("Vector store error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Skill manifest could not be parsed
    #[error("Manifest error: {0}")]
    Manifest(String),
}
