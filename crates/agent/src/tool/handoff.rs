//! `transfer_to_<agent>` tools used by the supervisor.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use prompt::{ChatMessage, MessageRole, ToolSpec};
use serde_json::{json, Value};
use tracing::info;

use super::{Tool, ToolContext};
use crate::ReactAgent;

/// Hands the conversation to a member agent and returns its final reply.
///
/// The member sees only user text and plain assistant replies (no tool traffic) and
/// runs without its checkpointer; the supervisor's thread owns the history.
#[derive(Clone)]
pub struct HandoffTool {
    name: String,
    agent: Arc<ReactAgent>,
}

impl HandoffTool {
    pub fn new(agent: Arc<ReactAgent>) -> Self {
        Self {
            name: format!("transfer_to_{}", agent.name()),
            agent,
        }
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }
}

fn conversation_only(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter(|m| match m.role {
            MessageRole::User => true,
            MessageRole::Assistant => !m.has_tool_calls() && !m.content.trim().is_empty(),
            MessageRole::System | MessageRole::Tool => false,
        })
        .cloned()
        .collect()
}

#[async_trait]
impl Tool for HandoffTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ToolSpec {
        let description = match self.agent.description() {
            Some(d) => format!("Ask agent '{}' for help. {}", self.agent.name(), d),
            None => format!("Ask agent '{}' for help", self.agent.name()),
        };
        ToolSpec {
            name: self.name.clone(),
            description,
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    async fn call(&self, _args: Value, ctx: &ToolContext) -> Result<String> {
        info!(agent = %self.agent.name(), thread_id = %ctx.config.thread_id, "handing off");
        let run = self
            .agent
            .run_detached(conversation_only(&ctx.messages), &ctx.config)
            .await?;
        Ok(run.last_reply().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt::ToolCall;

    #[test]
    fn test_conversation_only_drops_tool_traffic() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("What is 2 * 3?"),
            ChatMessage::assistant_with_tools("", vec![ToolCall::new("c", "transfer_to_math", json!({}))]),
            ChatMessage::tool("c", "transfer_to_math", "6"),
            ChatMessage::assistant("It is 6."),
        ];
        let kept = conversation_only(&messages);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].role, MessageRole::User);
        assert_eq!(kept[1].content, "It is 6.");
    }
}
