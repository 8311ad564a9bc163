//! Local embedding provider placeholder implementation
//!
//! Stands in for a local model runtime (ONNX / candle sentence encoders)
//! until one is wired in. The default mode hashes tokens into a fixed
//! number of buckets and normalises the result, which gives embeddings
//! real cosine structure: texts sharing vocabulary land close together.
//! That property is what the engine's fingerprint pruning and semantic
//! cache tests exercise.

use crate::error::Result;
use async_trait::async_trait;
use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default dimensionality, matching the MiniLM family this stands in for
const DEFAULT_DIMENSIONS: usize = 384;

/// Local embedding model placeholder
///
/// Deterministic by default: the same text always produces the same unit
/// vector, and token overlap translates into cosine similarity. A random
/// mode exists for load tests where collisions must not correlate.
#[derive(Debug)]
pub struct LocalEmbedding {
    /// Model identifier
    model_id: String,

    /// Number of dimensions
    dimensions: usize,

    /// Whether to produce random instead of hashed embeddings
    random: bool,
}

impl LocalEmbedding {
    /// Create a new local embedding model
    pub fn new(model_id: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dimensions,
            random: false,
        }
    }

    /// Create the default MiniLM-sized placeholder
    #[must_use]
    pub fn minilm() -> Self {
        Self::new("all-MiniLM-L6-v2", DEFAULT_DIMENSIONS)
    }

    /// Switch to random (non-deterministic) embeddings
    #[must_use]
    pub const fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    /// Hashed bag-of-words embedding, normalised to a unit vector
    #[allow(clippy::cast_possible_truncation)]
    fn hashed_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric() && c != '@' && c != '#')
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimensions;
            embedding[bucket] += 1.0;
        }

        normalize(&mut embedding);
        embedding
    }

    /// Random unit vector, for the non-deterministic mode
    fn random_embedding(&self) -> Vec<f32> {
        let mut rng = rand::thread_rng();
        let mut embedding: Vec<f32> = (0..self.dimensions)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();
        normalize(&mut embedding);
        embedding
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        if self.random {
            self.random_embedding()
        } else {
            self.hashed_embedding(text)
        }
    }
}

impl Default for LocalEmbedding {
    fn default() -> Self {
        Self::minilm()
    }
}

fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}

#[async_trait]
impl super::EmbeddingProvider for LocalEmbedding {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EmbeddingProvider;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_deterministic_and_normalised() {
        let model = LocalEmbedding::minilm();
        let texts = vec!["Hello world".to_string(), "Testing embeddings".to_string()];

        let embeddings = model.embed_documents(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);

        for embedding in &embeddings {
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 0.001, "not normalised: {norm}");
        }

        let again = model.embed_documents(&texts).await.unwrap();
        assert_eq!(embeddings, again);
    }

    #[tokio::test]
    async fn test_token_overlap_raises_similarity() {
        let model = LocalEmbedding::minilm();
        let base = model.embed_query("actor isolation data race").await.unwrap();
        let related = model.embed_query("actor isolation rules").await.unwrap();
        let unrelated = model.embed_query("navigation stack deep link").await.unwrap();

        assert!(cosine(&base, &related) > cosine(&base, &unrelated));
    }

    #[tokio::test]
    async fn test_query_and_document_modes_agree() {
        let model = LocalEmbedding::minilm();
        let doc = model
            .embed_documents(&["same text".to_string()])
            .await
            .unwrap();
        let query = model.embed_query("same text").await.unwrap();
        assert_eq!(doc[0], query);
    }

    #[tokio::test]
    async fn test_random_mode_differs() {
        let model = LocalEmbedding::minilm().with_random(true);
        let a = model.embed_query("text").await.unwrap();
        let b = model.embed_query("text").await.unwrap();
        assert_ne!(a, b);
    }
}
