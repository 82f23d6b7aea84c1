//! # Prompt
//!
//! Chat message types shared by the LLM clients and the agent loop, plus the
//! memory-aware system prompt used by agents that read from a memory store.
//!
//! ## Memory prompt format
//!
//! ```text
//! You are a helpful {role}.
//!
//! ## Memories
//! <memories>
//! [key] content
//! </memories>
//! ```
//!
//! With `private = true` the heading becomes `## Your Personal Memories` and the prompt
//! tells the agent to save useful facts with its memory tool.

use memory_core::SearchItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message, possibly carrying tool calls (API `role: "assistant"`).
    Assistant,
    /// Result of a tool call (API `role: "tool"`).
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments (an object for well-behaved models).
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Tool definition offered to the model; `parameters` is a JSON schema object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on `Tool` messages: the id of the call being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Agent name on assistant messages, tool name on tool messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, content)
    }

    /// Assistant turn that requests tool calls.
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(MessageRole::Assistant, content)
        }
    }

    /// Tool result answering `tool_call_id`.
    pub fn tool(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(tool_name.into()),
            ..Self::plain(MessageRole::Tool, content)
        }
    }

    /// Sets the speaker name (e.g. the agent that produced an assistant message).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Formats a transcript as `Role: content` lines, e.g. for the memory manager prompt.
pub fn format_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| {
            let role = match m.role {
                MessageRole::System => "System",
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
                MessageRole::Tool => "Tool",
            };
            format!("{}: {}", role, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per memory: `[key] content`.
pub fn format_memories_block(items: &[SearchItem]) -> String {
    items
        .iter()
        .map(|hit| format!("[{}] {}", hit.item.key, hit.item.content_text()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// System prompt for an agent that reads memories from the store.
pub fn memory_system_prompt(role: &str, memories: &[SearchItem], private: bool) -> String {
    let block = format_memories_block(memories);
    if private {
        format!(
            "You are a helpful {role}.\n\n## Your Personal Memories\n<memories>\n{block}\n</memories>\n\n\
             Always use your memory tool to save important information that might be useful for future conversations.\n\
             Your memories are private and separate from other agents.\n"
        )
    } else {
        format!("You are a helpful {role}.\n\n## Memories\n<memories>\n{block}\n</memories>\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use memory_core::{Item, Namespace};
    use serde_json::json;

    fn hit(key: &str, value: Value) -> SearchItem {
        let now = Utc::now();
        SearchItem {
            item: Item {
                namespace: Namespace::new(["memories"]).unwrap(),
                key: key.to_string(),
                value,
                created_at: now,
                updated_at: now,
            },
            score: Some(0.9),
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::tool("call_1", "add", "3");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_message_deserializes_without_optional_fields() {
        let msg: ChatMessage = serde_json::from_value(json!({"role": "user", "content": "hi"})).unwrap();
        assert_eq!(msg, ChatMessage::user("hi"));
    }

    #[test]
    fn test_memory_prompt_public() {
        let prompt = memory_system_prompt(
            "assistant",
            &[hit("a", json!({"content": "likes tea"}))],
            false,
        );
        assert!(prompt.starts_with("You are a helpful assistant.\n\n## Memories\n<memories>\n"));
        assert!(prompt.contains("[a] likes tea"));
        assert!(prompt.ends_with("</memories>\n"));
    }

    #[test]
    fn test_memory_prompt_private() {
        let prompt = memory_system_prompt("math expert", &[], true);
        assert!(prompt.contains("You are a helpful math expert."));
        assert!(prompt.contains("## Your Personal Memories"));
        assert!(prompt.contains("private and separate from other agents"));
    }

    #[test]
    fn test_transcript_skips_system() {
        let out = format_transcript(&[
            ChatMessage::system("sys"),
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there"),
        ]);
        assert_eq!(out, "User: hello\nAssistant: hi there");
    }
}
