//! System prompts rendered before every LLM turn.

use anyhow::Result;
use async_trait::async_trait;
use memory_core::{MemoryStore, NamespaceTemplate, SearchRequest};
use prompt::{memory_system_prompt, ChatMessage};
use tracing::{debug, warn};

use crate::RunConfig;

/// Produces the system message for the next turn.
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn render(
        &self,
        messages: &[ChatMessage],
        config: &RunConfig,
        store: Option<&dyn MemoryStore>,
    ) -> Result<String>;
}

/// Fixed system prompt.
#[derive(Debug, Clone)]
pub struct StaticPrompt(pub String);

impl StaticPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

#[async_trait]
impl PromptSource for StaticPrompt {
    async fn render(
        &self,
        _messages: &[ChatMessage],
        _config: &RunConfig,
        _store: Option<&dyn MemoryStore>,
    ) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Searches the store with the latest message and injects the hits as a `<memories>` block.
#[derive(Debug, Clone)]
pub struct MemoryPrompt {
    pub role: String,
    pub namespace: NamespaceTemplate,
    pub limit: usize,
    /// Use the per-agent wording ("Your Personal Memories").
    pub private: bool,
}

impl MemoryPrompt {
    pub fn new(role: impl Into<String>, namespace: impl Into<NamespaceTemplate>) -> Self {
        Self {
            role: role.into(),
            namespace: namespace.into(),
            limit: memory_core::DEFAULT_SEARCH_LIMIT,
            private: false,
        }
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl PromptSource for MemoryPrompt {
    async fn render(
        &self,
        messages: &[ChatMessage],
        config: &RunConfig,
        store: Option<&dyn MemoryStore>,
    ) -> Result<String> {
        let query = messages
            .last()
            .map(|m| m.content.trim())
            .filter(|q| !q.is_empty());

        let memories = match (store, query) {
            (Some(store), Some(query)) => {
                let namespace = config.resolve(&self.namespace)?;
                let request = SearchRequest::new(namespace)
                    .with_query(query)
                    .with_limit(self.limit);
                match store.search(request).await {
                    Ok(hits) => hits,
                    Err(e) => {
                        warn!(error = %e, "memory search for prompt failed; rendering without memories");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };
        debug!(role = %self.role, memories = memories.len(), "rendered memory prompt");
        Ok(memory_system_prompt(&self.role, &memories, self.private))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_core::Namespace;
    use memory_inmemory::InMemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_prompt_injects_hits() {
        let store = InMemoryStore::new();
        let ns = Namespace::new(["memories"]).unwrap();
        store.put(&ns, "k1", json!({"content": "prefers dark mode"})).await.unwrap();

        let prompt = MemoryPrompt::new("assistant", ns);
        let text = prompt
            .render(
                &[ChatMessage::user("what do you know about me?")],
                &RunConfig::new("t"),
                Some(&store),
            )
            .await
            .unwrap();
        assert!(text.contains("<memories>\n[k1] prefers dark mode\n</memories>"));
    }

    #[tokio::test]
    async fn test_memory_prompt_without_store() {
        let prompt = MemoryPrompt::new("math expert", Namespace::new(["math_memories"]).unwrap()).private();
        let text = prompt
            .render(&[ChatMessage::user("hi")], &RunConfig::new("t"), None)
            .await
            .unwrap();
        assert!(text.starts_with("You are a helpful math expert."));
        assert!(text.contains("<memories>\n\n</memories>"));
    }
}
