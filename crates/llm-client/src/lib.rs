//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait used by agents and the memory manager, with two
//! implementations:
//!
//! - [`OllamaChatClient`]: local models over Ollama's `/api/chat` (reqwest)
//! - [`OpenAIChatClient`]: OpenAI or Azure OpenAI over async-openai
//!
//! A completion takes the conversation plus the tools on offer and returns an
//! [`AssistantTurn`]: reply text and any tool calls the model asked for.
//! [`build_llm_client`] picks the implementation from [`EnvLlmConfig`].

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use prompt::{ChatMessage, ToolCall, ToolSpec};
use serde_json::Value;
use tracing::warn;

mod config;
mod error;
mod ollama;
mod openai;

pub use config::{
    EnvLlmConfig, LlmProvider, DEFAULT_AZURE_API_VERSION, DEFAULT_AZURE_DEPLOYMENT,
    DEFAULT_LOCAL_MODEL, DEFAULT_MAX_TOKENS,
};
pub use error::LlmError;
pub use ollama::OllamaChatClient;
pub use openai::OpenAIChatClient;

/// Messages and tools for one completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSpec>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

/// The model's reply: text and requested tool calls (possibly both).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantTurn {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn into_message(self) -> ChatMessage {
        ChatMessage::assistant_with_tools(self.content, self.tool_calls)
    }
}

/// LLM client interface: one completion per call, tools optional.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Runs one completion over `request.messages`, offering `request.tools`.
    async fn complete(&self, request: CompletionRequest) -> Result<AssistantTurn>;

    /// Model (or deployment) name, for logging.
    fn model(&self) -> &str;

    /// Single user prompt, no tools; returns the reply text.
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let turn = self
            .complete(CompletionRequest::new(vec![ChatMessage::user(prompt)]))
            .await?;
        Ok(turn.content)
    }
}

/// Builds the client selected by `config.provider`.
pub fn build_llm_client(config: &EnvLlmConfig) -> Result<Arc<dyn LlmClient>> {
    config.validate()?;
    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Ollama => {
            let mut client = OllamaChatClient::new(&config.ollama_base_url, &config.llm_model)
                .with_temperature(config.temperature)
                .with_max_tokens(config.max_tokens);
            if let Some(key) = config.api_key.as_deref() {
                client = client.with_api_key(key);
            }
            Arc::new(client)
        }
        LlmProvider::Azure => Arc::new(OpenAIChatClient::azure(config)?),
        LlmProvider::OpenAI => Arc::new(OpenAIChatClient::openai(config)?),
    };
    Ok(client)
}

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();
    if len <= 11 {
        "***".to_string()
    } else {
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[len - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}

/// Parses tool-call arguments the model sent as a JSON string.
/// Unparseable text is kept as a JSON string so the tool can report it.
pub(crate) fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "tool call arguments are not valid JSON");
        Value::String(raw.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("{oops"), json!("{oops"));
    }

    #[test]
    fn test_turn_into_message() {
        let turn = AssistantTurn {
            content: String::new(),
            tool_calls: vec![ToolCall::new("c1", "add", json!({"a": 1, "b": 2}))],
        };
        let msg = turn.into_message();
        assert!(msg.has_tool_calls());
        assert_eq!(msg.tool_calls[0].name, "add");
    }
}
