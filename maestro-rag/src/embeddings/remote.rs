//! Remote embedding provider over HTTP
//!
//! Adapter for a hosted embeddings API in the Voyage style: the request
//! carries an `input_type` of `"document"` or `"query"` so the service can
//! apply asymmetric encodings. Inputs are sent in batches of 128 per
//! request; batching exists for throughput, not correctness.

use crate::error::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum inputs per remote API request
const REMOTE_BATCH_SIZE: usize = 128;

/// Default endpoint of the hosted embeddings API
const DEFAULT_BASE_URL: &str = "https://api.voyageai.com/v1";

/// Environment variable holding the API key
const API_KEY_ENV: &str = "VOYAGE_API_KEY";

/// Remote embedding model over HTTP
#[derive(Debug)]
pub struct RemoteEmbedding {
    /// Model name (e.g. voyage-code-3)
    model: String,

    /// API key
    api_key: String,

    /// HTTP client
    client: Client,

    /// Base URL
    base_url: String,

    /// Dimensionality reported by the model
    dimensions: usize,
}

impl RemoteEmbedding {
    /// Create a remote embedding provider
    ///
    /// # Errors
    ///
    /// Returns `RagError::Embedding` when the API key environment variable
    /// is not set.
    pub fn new(model: impl Into<String>, dimensions: usize) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            RagError::Embedding(format!("API key environment variable '{API_KEY_ENV}' not set"))
        })?;
        Ok(Self {
            model: model.into(),
            api_key,
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimensions,
        })
    }

    /// Override the API base URL (self-hosted gateways, tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Embed a batch of texts with the given input type
    async fn embed_batched(&self, texts: &[String], input_type: &str) -> Result<Vec<Vec<f32>>> {
        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(REMOTE_BATCH_SIZE) {
            all.extend(self.embed_request(batch, input_type).await?);
        }
        Ok(all)
    }

    async fn embed_request(&self, batch: &[String], input_type: &str) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            input: batch.to_vec(),
            model: self.model.clone(),
            input_type: input_type.to_string(),
        };

        let url = format!("{}/embeddings", self.base_url);
        debug!("embedding {} texts as {input_type}", batch.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(RagError::Embedding(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("malformed response: {e}")))?;

        // Re-sort by index so output order matches input order
        let mut data = result.data;
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}

#[async_trait]
impl super::EmbeddingProvider for RemoteEmbedding {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_batched(texts, "document").await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batched(&[text.to_string()], "query").await?;
        embeddings
            .pop()
            .ok_or_else(|| RagError::Embedding("empty embedding response".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    input: Vec<String>,
    model: String,
    input_type: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
