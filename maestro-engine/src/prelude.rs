//! Convenience re-exports for common maestro-engine usage

pub use crate::bm25::Bm25Index;
pub use crate::cache::QueryCache;
pub use crate::config::MaestroConfig;
pub use crate::engine::{MaestroEngine, MaestroEngineBuilder};
pub use crate::error::{EngineError, Result};
pub use crate::fingerprint::SkillFingerprint;
pub use crate::rerank::Reranker;
pub use crate::types::{EngineStatus, IndexReport, SearchResponse, SearchResult, SkillStatus};
