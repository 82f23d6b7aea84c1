//! # Ollama Embedding Service
//!
//! This crate provides an implementation of the `EmbeddingService` trait using a local
//! Ollama server's `/api/embed` endpoint.
//!
//! ## OllamaEmbedding
//!
//! Uses locally served embedding models (e.g. `nomic-embed-text`, `mxbai-embed-large`).
//!
//! **Advantages**:
//! - No per-request cost, data stays local
//! - Batch input in a single request
//!
//! **Considerations**:
//! - Requires a running Ollama server with the model pulled
//! - Vector size depends on the model (768 for `nomic-embed-text`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use ollama_embedding::OllamaEmbedding;
//! use embedding::EmbeddingService;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let service = OllamaEmbedding::new("http://localhost:11434", "nomic-embed-text");
//!     let embedding = service.embed("Hello world").await?;
//!     println!("Embedding dimension: {}", embedding.len());
//!     Ok(())
//! }
//! ```
//!
//! When `API_KEY` is configured the key is sent as `X-Api-Key`, for deployments that put
//! an authenticating proxy in front of Ollama.

use std::time::Duration;

use async_trait::async_trait;
use embedding::{EmbeddingConfig, EmbeddingService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

const EMBED_TIMEOUT: Duration = Duration::from_secs(30);
const EMBED_BATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Ollama embedding service implementation.
#[derive(Debug, Clone)]
pub struct OllamaEmbedding {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OllamaEmbedding {
    /// Creates a new Ollama embedding service.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root, e.g. `http://localhost:11434`. A trailing `/` is ignored.
    /// * `model` - The embedding model to use (e.g. `nomic-embed-text`).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            model: model.into(),
            api_key: None,
        }
    }

    /// Builds the service from an [`EmbeddingConfig`].
    pub fn from_config(config: &dyn EmbeddingConfig) -> Self {
        let service = Self::new(config.base_url(), config.model());
        match config.api_key() {
            Some(key) => service.with_api_key(key),
            None => service,
        }
    }

    /// Sends `key` as `X-Api-Key` on every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets a different embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.base_url)
    }

    async fn request(&self, inputs: &[&str], timeout: Duration) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let request = EmbedRequest {
            model: &self.model,
            input: inputs,
        };

        let mut builder = self.client.post(self.endpoint()).timeout(timeout).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-Api-Key", key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Ollama embed request failed");
            anyhow::anyhow!("Ollama embed request failed: {}", e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error ({}): {}", status, error_text));
        }

        let body: EmbedResponse = response.json().await?;
        debug!(count = body.embeddings.len(), "Ollama embed response received");
        Ok(body.embeddings)
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingService for OllamaEmbedding {
    /// Generates an embedding vector for a single text string.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable, answers with a non-success status,
    /// or the response holds no embedding.
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        info!(model = %self.model, text_len = text.len(), "step: embedding Ollama embed request");

        let mut embeddings = self.request(&[text], EMBED_TIMEOUT).await?;
        if embeddings.is_empty() {
            warn!("Ollama embed response has no embedding data");
            return Err(anyhow::anyhow!("No embedding in response"));
        }
        let embedding = embeddings.swap_remove(0);

        info!(dimension = embedding.len(), "step: embedding Ollama embed done");
        Ok(embedding)
    }

    /// Generates embedding vectors for multiple texts in a single request, in input order.
    /// An empty input returns an empty result without contacting the server.
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            debug!("Ollama embed_batch empty input, skipping");
            return Ok(vec![]);
        }

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let embeddings = self.request(&inputs, EMBED_BATCH_TIMEOUT).await?;

        if embeddings.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = embeddings.len(),
                "Ollama embed_batch response count mismatch"
            );
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ));
        }

        let dimension = embeddings.first().map(|v| v.len()).unwrap_or(0);
        info!(
            count = embeddings.len(),
            dimension = dimension,
            "step: embedding Ollama embed_batch done"
        );
        Ok(embeddings)
    }
}
