//! # Text Embeddings
//!
//! This crate defines the embedding service interface used by the memory stores to
//! index memories and embed search queries.

use async_trait::async_trait;

mod config;
pub use config::{
    EmbeddingConfig, EnvEmbeddingConfig, DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_BASE_URL,
};

/// Service for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts in a single API call.
    /// This is more efficient than calling `embed` multiple times.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;
}
