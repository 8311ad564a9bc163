//! # Maestro Engine
//!
//! Retrieval engine over a corpus of "skills" — directories of markdown
//! documents describing programming practices. Turns a natural-language
//! query into a small, high-precision set of passages suitable for
//! injection into an LLM prompt.
//!
//! ## Pipeline Stages
//!
//! 1. **Cache lookup** → exact, then semantic (query-embedding cosine)
//! 2. **Query expansion** → concept graph adds related terms
//! 3. **Skill fingerprinting** → prune irrelevant skills before search
//! 4. **Hybrid retrieval** → semantic (vector store) + lexical (BM25)
//! 5. **Reciprocal Rank Fusion** → merge the two ranked lists
//! 6. **Reranking** → optional cross-encoder pass over the fused set
//! 7. **Assembly** → truncate, collect skills, build the response
//!
//! ## Usage
//!
//! ```rust,no_run
//! use maestro_engine::prelude::*;
//! use maestro_rag::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> maestro_engine::Result<()> {
//! let config = MaestroConfig::default();
//! let engine = MaestroEngine::builder(config)
//!     .with_embedding_provider(Arc::new(LocalEmbedding::minilm()))
//!     .with_vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! let response = engine.search("Sendable conformance for actors", None).await?;
//! println!("{}", response.to_context(3000));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Lexical BM25 index over chunk bodies
pub mod bm25;

/// Exact and semantic query cache
pub mod cache;

/// Engine configuration
pub mod config;

/// Indexing and the search pipeline
pub mod engine;

/// Error types and handling
pub mod error;

/// Per-skill fingerprints and pruning
pub mod fingerprint;

/// Cross-encoder reranker contract
pub mod rerank;

/// Shared types and data structures
pub mod types;

/// Convenience re-exports
pub mod prelude;

pub use config::MaestroConfig;
pub use engine::{MaestroEngine, MaestroEngineBuilder};
pub use error::{EngineError, Result};
pub use types::{SearchResponse, SearchResult};
