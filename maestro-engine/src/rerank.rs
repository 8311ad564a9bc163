//! Cross-encoder reranker contract
//!
//! A cross-encoder scores `(query, passage)` pairs directly — more precise
//! than bi-encoder similarity, but slower, so it only runs over the small
//! fused candidate set. The engine treats the reranker as optional: absent,
//! disabled, or failing, the fusion ordering stands and no result carries a
//! rerank score.

use crate::error::Result;
use async_trait::async_trait;

/// Contract for cross-encoder rerankers
///
/// One implementation per model runtime; the engine only depends on this
/// seam. Scores are model logits: ordering is meaningful, the scale is not
/// bounded to `[0, 1]`.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score a batch of `(query, passage)` pairs
    ///
    /// Returns one score per input pair, in input order.
    ///
    /// # Errors
    ///
    /// Implementations surface model or transport failures; the engine
    /// swallows them and keeps the pre-rerank ordering.
    async fn predict(&self, pairs: &[(String, String)]) -> Result<Vec<f32>>;
}
