//! Shared test utilities for agent integration tests.
//!
//! Provides `ScriptedLlm` (LlmClient) that replays queued turns and records every request.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use llm_client::{AssistantTurn, CompletionRequest, LlmClient};
use prompt::ToolCall;
use serde_json::Value;

/// Mock LLM: pops one queued turn per `complete` call.
pub struct ScriptedLlm {
    turns: Mutex<VecDeque<AssistantTurn>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl ScriptedLlm {
    pub fn new(turns: Vec<AssistantTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.turns.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<AssistantTurn> {
        self.requests.lock().unwrap().push(request);
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted llm ran out of turns"))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Assistant turn with a single tool call.
#[allow(dead_code)]
pub fn call(id: &str, name: &str, arguments: Value) -> AssistantTurn {
    AssistantTurn {
        content: String::new(),
        tool_calls: vec![ToolCall::new(id, name, arguments)],
    }
}

#[allow(dead_code)]
pub fn reply(text: &str) -> AssistantTurn {
    AssistantTurn::text(text)
}
