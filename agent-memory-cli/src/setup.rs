//! Builds the LLM, embedding service and stores from the environment.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use embedding::{EmbeddingConfig, EmbeddingService, EnvEmbeddingConfig};
use llm_client::{build_llm_client, mask_token, EnvLlmConfig, LlmClient};
use memory_core::IndexConfig;
use memory_inmemory::InMemoryStore;
use memory_sqlite::SqliteStore;
use ollama_embedding::OllamaEmbedding;
use tracing::info;

/// Everything the demos share.
#[derive(Clone)]
pub struct Runtime {
    pub llm: Arc<dyn LlmClient>,
    pub embedding: Arc<dyn EmbeddingService>,
    pub index: IndexConfig,
}

impl Runtime {
    /// Reads `LLM_*`, provider keys, `EMBEDDING_*` and `OLLAMA_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let llm_config = EnvLlmConfig::from_env().context("Load LLM config from .env")?;
        let llm = build_llm_client(&llm_config)?;
        info!(
            provider = %llm_config.provider,
            model = %llm.model(),
            api_key = %llm_config.api_key.as_deref().map(mask_token).unwrap_or_default(),
            "LLM client ready"
        );

        let embedding_config = EnvEmbeddingConfig::from_env().context("Load embedding config from .env")?;
        embedding_config.validate()?;
        let embedding: Arc<dyn EmbeddingService> = Arc::new(OllamaEmbedding::from_config(&embedding_config));
        let mut index = IndexConfig::default();
        if let Some(dims) = embedding_config.dims() {
            index = index.with_dims(dims);
        }
        info!(model = %embedding_config.model(), dims = ?index.dims, "embedding service ready");

        Ok(Self { llm, embedding, index })
    }

    /// Process-local store with the embedding index.
    pub fn in_memory_store(&self) -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::with_index(
            self.index.clone(),
            Arc::clone(&self.embedding),
        ))
    }

    /// SQLite store with the embedding index; survives restarts.
    pub async fn sqlite_store(&self, path: &Path) -> Result<Arc<SqliteStore>> {
        let url = path
            .to_str()
            .with_context(|| format!("database path is not UTF-8: {}", path.display()))?;
        let store = SqliteStore::new(url)
            .await?
            .with_index(self.index.clone(), Arc::clone(&self.embedding));
        Ok(Arc::new(store))
    }
}
