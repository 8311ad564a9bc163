//! Convenience re-exports for common maestro-rag usage

pub use crate::chunking::MarkdownChunker;
pub use crate::embeddings::{
    create_provider, EmbeddingConfig, EmbeddingProvider, EmbeddingProviderKind, LocalEmbedding,
    RemoteEmbedding,
};
pub use crate::error::{RagError, Result};
pub use crate::skills::{discover_skills, markdown_files, SkillManifest};
pub use crate::storage::{
    cosine_similarity, FilesystemVectorStore, InMemoryVectorStore, MetadataFilter, StoredDocument,
    VectorMatch, VectorRecord, VectorStore,
};
pub use crate::types::Chunk;
