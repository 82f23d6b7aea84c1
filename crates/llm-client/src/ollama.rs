//! Ollama `/api/chat` client with tool calling.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use prompt::{ChatMessage, MessageRole, ToolCall, ToolSpec};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{mask_token, AssistantTurn, CompletionRequest, LlmClient, LlmError};

const CHAT_TIMEOUT: Duration = Duration::from_secs(300);

/// Chat client for a local (or proxied) Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaChatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OllamaChatClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sends `key` as `X-Api-Key` on every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Caps generated tokens (`options.num_predict`).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolSpec,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

fn to_ollama_message(msg: &ChatMessage) -> OllamaMessage {
    let role = match msg.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    };
    OllamaMessage {
        role: role.to_string(),
        content: msg.content.clone(),
        tool_calls: msg
            .tool_calls
            .iter()
            .map(|c| OllamaToolCall {
                function: OllamaFunctionCall {
                    name: c.name.clone(),
                    arguments: c.arguments.clone(),
                },
            })
            .collect(),
        tool_name: match msg.role {
            MessageRole::Tool => msg.name.clone(),
            _ => None,
        },
    }
}

fn from_ollama_call(call: OllamaToolCall) -> ToolCall {
    // Ollama sends arguments as an object; some proxies send a JSON string.
    let arguments = match call.function.arguments {
        Value::String(raw) => crate::parse_arguments(&raw),
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    ToolCall::new(
        format!("call_{}", Uuid::new_v4().simple()),
        call.function.name,
        arguments,
    )
}

#[async_trait]
impl LlmClient for OllamaChatClient {
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len(), tools = request.tools.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<AssistantTurn> {
        info!(
            model = %self.model,
            message_count = request.messages.len(),
            api_key = %self.api_key.as_deref().map(mask_token).unwrap_or_else(|| "none".to_string()),
            "Ollama chat request"
        );

        let options = if self.temperature.is_some() || self.max_tokens.is_some() {
            Some(OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            })
        } else {
            None
        };
        let body = OllamaChatRequest {
            model: &self.model,
            messages: request.messages.iter().map(to_ollama_message).collect(),
            tools: request
                .tools
                .iter()
                .map(|t| OllamaTool {
                    kind: "function",
                    function: t,
                })
                .collect(),
            stream: false,
            options,
        };

        let mut builder = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(CHAT_TIMEOUT)
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-Api-Key", key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Ollama chat request failed");
            anyhow::anyhow!("Ollama chat request failed: {}", e)
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: "Ollama",
                status,
                body,
            }
            .into());
        }

        let parsed: OllamaChatResponse = response.json().await?;
        info!(
            prompt_tokens = parsed.prompt_eval_count.unwrap_or(0),
            completion_tokens = parsed.eval_count.unwrap_or(0),
            "Ollama chat usage"
        );
        let message = parsed.message.ok_or(LlmError::EmptyResponse("Ollama"))?;
        let turn = AssistantTurn {
            content: message.content,
            tool_calls: message.tool_calls.into_iter().map(from_ollama_call).collect(),
        };
        debug!(tool_calls = turn.tool_calls.len(), "Ollama chat turn parsed");
        Ok(turn)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_message_carries_tool_name() {
        let msg = to_ollama_message(&ChatMessage::tool("c1", "add", "3"));
        assert_eq!(msg.role, "tool");
        assert_eq!(msg.tool_name.as_deref(), Some("add"));
    }

    #[test]
    fn test_string_arguments_are_parsed() {
        let call = from_ollama_call(OllamaToolCall {
            function: OllamaFunctionCall {
                name: "add".to_string(),
                arguments: json!("{\"a\": 1}"),
            },
        });
        assert_eq!(call.arguments, json!({"a": 1}));
        assert!(call.id.starts_with("call_"));
    }
}
