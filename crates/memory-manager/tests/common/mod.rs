//! Shared test utilities for memory-manager integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use llm_client::{AssistantTurn, CompletionRequest, LlmClient};

/// Mock LLM replaying queued text replies and recording requests.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Content of the user message of the n-th request.
    pub fn user_prompt(&self, n: usize) -> String {
        self.requests()[n].messages[1].content.clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<AssistantTurn> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted llm ran out of replies"))?;
        Ok(AssistantTurn::text(reply))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
