//! LLM-driven extraction of memories from a conversation.

use std::collections::HashSet;
use std::sync::Arc;

use agent::RunConfig;
use anyhow::Result;
use llm_client::{CompletionRequest, LlmClient};
use memory_core::{MemoryStore, Namespace, NamespaceTemplate, SearchItem, SearchRequest};
use prompt::{format_transcript, ChatMessage};
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::parse::{parse_extraction, MemoryOp};

pub const DEFAULT_QUERY_LIMIT: usize = 5;

pub const DEFAULT_INSTRUCTIONS: &str = "Extract durable facts about the user from the conversation: \
identity, preferences, relationships, ongoing projects and habits. Skip small talk and anything \
only relevant to the current exchange. Prefer updating an existing memory over creating a near duplicate, \
and delete memories the conversation shows are wrong.";

/// A change applied to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryChange {
    Created { key: String, content: String },
    Updated { key: String, content: String },
    Deleted { key: String },
}

impl MemoryChange {
    pub fn key(&self) -> &str {
        match self {
            Self::Created { key, .. } | Self::Updated { key, .. } | Self::Deleted { key } => key,
        }
    }
}

/// Reads conversations and keeps the memories of one namespace up to date.
pub struct MemoryStoreManager {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn MemoryStore>,
    namespace: NamespaceTemplate,
    instructions: String,
    query_limit: usize,
    enable_inserts: bool,
    enable_updates: bool,
    enable_deletes: bool,
}

impl MemoryStoreManager {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn MemoryStore>,
        namespace: impl Into<NamespaceTemplate>,
    ) -> Self {
        Self {
            llm,
            store,
            namespace: namespace.into(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            query_limit: DEFAULT_QUERY_LIMIT,
            enable_inserts: true,
            enable_updates: true,
            enable_deletes: true,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Number of existing memories shown to the model.
    pub fn with_query_limit(mut self, limit: usize) -> Self {
        self.query_limit = limit;
        self
    }

    pub fn enable_inserts(mut self, enabled: bool) -> Self {
        self.enable_inserts = enabled;
        self
    }

    pub fn enable_updates(mut self, enabled: bool) -> Self {
        self.enable_updates = enabled;
        self
    }

    pub fn enable_deletes(mut self, enabled: bool) -> Self {
        self.enable_deletes = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// Extracts and applies memory changes for `messages`.
    ///
    /// Repeats while the model keeps changing memories, has not said `done`, and fewer than
    /// `max_steps` rounds ran. Update and delete ids must name a memory shown to the model.
    #[instrument(skip(self, messages), fields(thread_id = %config.thread_id, messages = messages.len()))]
    pub async fn process(
        &self,
        messages: &[ChatMessage],
        max_steps: usize,
        config: &RunConfig,
    ) -> Result<Vec<MemoryChange>> {
        let namespace = config.resolve(&self.namespace)?;
        let transcript = format_transcript(messages);
        if transcript.trim().is_empty() {
            debug!("empty conversation; nothing to extract");
            return Ok(Vec::new());
        }

        let mut changes = Vec::new();
        for step in 0..max_steps.max(1) {
            let existing = self.existing(&namespace, &transcript).await?;
            let reply = self
                .llm
                .complete(CompletionRequest::new(vec![
                    ChatMessage::system(self.system_prompt()),
                    ChatMessage::user(user_prompt(&transcript, &existing)),
                ]))
                .await?;
            let extraction = parse_extraction(&reply.content)?;

            let known: HashSet<&str> = existing.iter().map(|s| s.item.key.as_str()).collect();
            let mut applied = 0;
            for op in extraction.memories {
                if let Some(change) = self.apply(&namespace, op, &known).await? {
                    changes.push(change);
                    applied += 1;
                }
            }
            debug!(step, applied, done = extraction.done, "extraction round finished");
            if applied == 0 || extraction.done {
                break;
            }
        }

        info!(namespace = %namespace, changes = changes.len(), "memories processed");
        Ok(changes)
    }

    async fn existing(&self, namespace: &Namespace, transcript: &str) -> Result<Vec<SearchItem>> {
        self.store
            .search(
                SearchRequest::new(namespace.clone())
                    .with_query(transcript)
                    .with_limit(self.query_limit),
            )
            .await
    }

    async fn apply(
        &self,
        namespace: &Namespace,
        op: MemoryOp,
        known: &HashSet<&str>,
    ) -> Result<Option<MemoryChange>> {
        match op {
            MemoryOp::Create { content } => {
                if !self.enable_inserts {
                    debug!("inserts disabled; skipping create");
                    return Ok(None);
                }
                let key = Uuid::new_v4().to_string();
                self.store
                    .put(namespace, &key, json!({ "content": content }))
                    .await?;
                Ok(Some(MemoryChange::Created { key, content }))
            }
            MemoryOp::Update { id, content } => {
                if !self.enable_updates {
                    debug!("updates disabled; skipping update");
                    return Ok(None);
                }
                if !known.contains(id.as_str()) {
                    warn!(id = %id, "model updated an unknown memory id; skipping");
                    return Ok(None);
                }
                self.store
                    .put(namespace, &id, json!({ "content": content }))
                    .await?;
                Ok(Some(MemoryChange::Updated { key: id, content }))
            }
            MemoryOp::Delete { id } => {
                if !self.enable_deletes {
                    debug!("deletes disabled; skipping delete");
                    return Ok(None);
                }
                if !known.contains(id.as_str()) {
                    warn!(id = %id, "model deleted an unknown memory id; skipping");
                    return Ok(None);
                }
                self.store.delete(namespace, &id).await?;
                Ok(Some(MemoryChange::Deleted { key: id }))
            }
        }
    }

    fn system_prompt(&self) -> String {
        let mut allowed = Vec::new();
        if self.enable_inserts {
            allowed.push(r#"{"action": "create", "content": "..."}"#);
        }
        if self.enable_updates {
            allowed.push(r#"{"action": "update", "id": "<existing id>", "content": "..."}"#);
        }
        if self.enable_deletes {
            allowed.push(r#"{"action": "delete", "id": "<existing id>"}"#);
        }
        format!(
            "You maintain the long-term memory of an assistant.\n\n{}\n\n\
             Reply with a single JSON object and nothing else:\n\
             {{\"memories\": [<changes>], \"done\": <true when nothing else should change>}}\n\n\
             Allowed changes:\n{}",
            self.instructions,
            allowed.join("\n")
        )
    }
}

fn user_prompt(transcript: &str, existing: &[SearchItem]) -> String {
    let memories: Vec<_> = existing
        .iter()
        .map(|s| json!({"id": s.item.key, "content": s.item.content_text()}))
        .collect();
    format!(
        "<conversation>\n{}\n</conversation>\n\n<existing_memories>\n{}\n</existing_memories>",
        transcript,
        serde_json::Value::Array(memories)
    )
}
