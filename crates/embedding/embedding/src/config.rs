//! Embedding configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;

/// Default local embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Default Ollama server.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Embedding service configuration interface.
pub trait EmbeddingConfig: Send + Sync {
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    /// Optional key sent as `X-Api-Key` (for an authenticating proxy in front of Ollama).
    fn api_key(&self) -> Option<&str>;
    /// Expected vector length; `None` disables the check.
    fn dims(&self) -> Option<usize>;
}

/// Embedding config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvEmbeddingConfig {
    pub ollama_base_url: String,
    pub embedding_model: String,
    pub api_key: Option<String>,
    pub embedding_dims: Option<usize>,
}

impl EmbeddingConfig for EnvEmbeddingConfig {
    fn base_url(&self) -> &str {
        &self.ollama_base_url
    }
    fn model(&self) -> &str {
        &self.embedding_model
    }
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|s| !s.is_empty())
    }
    fn dims(&self) -> Option<usize> {
        self.embedding_dims
    }
}

impl EnvEmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let ollama_base_url = env::var("OLLAMA_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());
        let embedding_model = env::var("EMBEDDING_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
        let api_key = env::var("API_KEY").ok().filter(|s| !s.trim().is_empty());
        let embedding_dims = match env::var("EMBEDDING_DIMS") {
            Ok(s) if !s.trim().is_empty() => Some(
                s.trim()
                    .parse::<usize>()
                    .with_context(|| format!("EMBEDDING_DIMS must be a positive integer, got {:?}", s))?,
            ),
            _ => None,
        };
        Ok(Self {
            ollama_base_url,
            embedding_model,
            api_key,
            embedding_dims,
        })
    }

    /// Validate config (a dimension of zero can never match).
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dims == Some(0) {
            anyhow::bail!("EMBEDDING_DIMS must be greater than zero");
        }
        if !self.ollama_base_url.starts_with("http://") && !self.ollama_base_url.starts_with("https://") {
            anyhow::bail!(
                "OLLAMA_BASE_URL must start with http:// or https://, got {:?}",
                self.ollama_base_url
            );
        }
        Ok(())
    }
}
