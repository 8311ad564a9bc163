//! Embedding provider contract and adapters
//!
//! Providers map text to fixed-dimension vectors in two modes: document
//! (what gets stored) and query (what gets searched with). All vectors from
//! a given provider have identical dimensionality. Failures are exceptional
//! and callers do not retry.

mod factory;
mod local;
mod provider;
mod remote;

pub use factory::{create_provider, EmbeddingConfig, EmbeddingProviderKind};
pub use local::LocalEmbedding;
pub use provider::EmbeddingProvider;
pub use remote::RemoteEmbedding;
