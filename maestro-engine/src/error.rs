//! Error types for the engine

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during indexing or search
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding provider failure (fatal to the enclosing call)
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Vector store failure
    #[error("Vector store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Ingestion-layer error
    #[error(transparent)]
    Rag(#[from] maestro_rag::RagError),
}
