//! # maestro-rag
//!
//! Ingestion infrastructure for the maestro knowledge engine.
//!
//! This crate provides:
//! - Markdown chunking into contextualised passages with stable ids
//! - Skill discovery and SKILL.md manifest parsing
//! - Pluggable embedding providers (document and query modes)
//! - A vector store contract with in-memory and filesystem adapters
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//! - `types`: The [`Chunk`] retrieval unit and its id derivation
//! - `chunking`: Markdown section splitting and token windowing
//! - `skills`: Skill directory discovery and manifests
//! - `embeddings`: [`EmbeddingProvider`] contract and adapters
//! - `storage`: [`VectorStore`] contract and adapters
//!
//! ## Usage
//!
//! ```rust,no_run
//! use maestro_rag::chunking::MarkdownChunker;
//! use std::path::Path;
//!
//! # fn example() -> maestro_rag::Result<()> {
//! let chunker = MarkdownChunker::new(400);
//! let chunks = chunker.chunk_file(
//!     Path::new("skills/swift/concurrency.md"),
//!     "swift",
//!     &["concurrency".to_string()],
//! )?;
//! println!("{} passages", chunks.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Markdown chunking strategies
pub mod chunking;

/// Embedding provider contract and adapters
pub mod embeddings;

/// Error types and handling
pub mod error;

/// Skill discovery and manifests
pub mod skills;

/// Vector store contract and adapters
pub mod storage;

/// Shared types and data structures
pub mod types;

/// Convenience re-exports
pub mod prelude;

pub use embeddings::EmbeddingProvider;
pub use error::{RagError, Result};
pub use storage::VectorStore;
pub use types::Chunk;
