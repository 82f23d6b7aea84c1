//! ReAct agent: LLM turn → tool calls → tool results → … → final reply.

use std::sync::Arc;

use llm_client::{CompletionRequest, LlmClient};
use memory_core::MemoryStore;
use prompt::ChatMessage;
use tracing::{debug, info, warn};

use crate::checkpoint::{Checkpoint, Checkpointer};
use crate::prompt_source::PromptSource;
use crate::tool::{Tool, ToolContext, ToolSet};
use crate::{AgentError, RunConfig};

/// Default limit on LLM turns per invocation.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// Result of one invocation.
#[derive(Debug, Clone, Default)]
pub struct AgentRun {
    /// Full thread history after the run.
    pub messages: Vec<ChatMessage>,
    /// Input plus everything the run appended.
    pub new_messages: Vec<ChatMessage>,
}

impl AgentRun {
    /// Content of the last assistant message.
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == prompt::MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }
}

/// A tool-calling agent with an optional store and checkpointer.
pub struct ReactAgent {
    name: String,
    description: Option<String>,
    llm: Arc<dyn LlmClient>,
    prompt: Option<Arc<dyn PromptSource>>,
    tools: ToolSet,
    store: Option<Arc<dyn MemoryStore>>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    max_steps: usize,
}

/// Builder for [`ReactAgent`].
pub struct ReactAgentBuilder {
    name: String,
    description: Option<String>,
    llm: Arc<dyn LlmClient>,
    prompt: Option<Arc<dyn PromptSource>>,
    tools: Vec<Arc<dyn Tool>>,
    store: Option<Arc<dyn MemoryStore>>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    max_steps: usize,
}

impl ReactAgentBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn prompt(mut self, prompt: impl PromptSource + 'static) -> Self {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    pub fn prompt_source(mut self, prompt: Arc<dyn PromptSource>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn tool_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Fails when two tools share a name.
    pub fn build(self) -> Result<ReactAgent, AgentError> {
        let mut tools = ToolSet::new();
        for tool in self.tools {
            tools.add(tool)?;
        }
        Ok(ReactAgent {
            name: self.name,
            description: self.description,
            llm: self.llm,
            prompt: self.prompt,
            tools,
            store: self.store,
            checkpointer: self.checkpointer,
            max_steps: self.max_steps,
        })
    }
}

impl ReactAgent {
    pub fn builder(name: impl Into<String>, llm: Arc<dyn LlmClient>) -> ReactAgentBuilder {
        ReactAgentBuilder {
            name: name.into(),
            description: None,
            llm,
            prompt: None,
            tools: Vec::new(),
            store: None,
            checkpointer: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn store(&self) -> Option<&Arc<dyn MemoryStore>> {
        self.store.as_ref()
    }

    /// Runs the agent on `input`, continuing the thread's checkpointed history.
    pub async fn invoke(
        &self,
        input: Vec<ChatMessage>,
        config: &RunConfig,
    ) -> Result<AgentRun, AgentError> {
        let (history, step) = match &self.checkpointer {
            Some(cp) => match cp
                .get(&config.thread_id)
                .await
                .map_err(AgentError::Checkpoint)?
            {
                Some(checkpoint) => (checkpoint.messages, checkpoint.step),
                None => (Vec::new(), 0),
            },
            None => (Vec::new(), 0),
        };
        debug!(agent = %self.name, thread_id = %config.thread_id, history = history.len(), "loaded thread");

        let outcome = self.run_loop(history, input, config).await;

        if let Some(cp) = &self.checkpointer {
            let messages = match &outcome {
                Ok(run) => run.messages.clone(),
                Err((partial, _)) => partial.clone(),
            };
            cp.put(&Checkpoint::new(config.thread_id.clone(), messages, step + 1))
                .await
                .map_err(AgentError::Checkpoint)?;
        }
        outcome.map_err(|(_, e)| e)
    }

    /// Runs on `messages` alone, without loading or saving checkpoints.
    pub async fn run_detached(
        &self,
        messages: Vec<ChatMessage>,
        config: &RunConfig,
    ) -> Result<AgentRun, AgentError> {
        self.run_loop(Vec::new(), messages, config)
            .await
            .map_err(|(_, e)| e)
    }

    /// On failure returns the messages accumulated so far with the error.
    async fn run_loop(
        &self,
        history: Vec<ChatMessage>,
        input: Vec<ChatMessage>,
        config: &RunConfig,
    ) -> Result<AgentRun, (Vec<ChatMessage>, AgentError)> {
        let start = history.len();
        let mut messages = history;
        messages.extend(input);
        let specs = self.tools.specs();

        for step in 0..self.max_steps {
            let mut request_messages = Vec::with_capacity(messages.len() + 1);
            if let Some(prompt) = &self.prompt {
                match prompt.render(&messages, config, self.store.as_deref()).await {
                    Ok(system) => request_messages.push(ChatMessage::system(system)),
                    Err(e) => return Err((messages, AgentError::Prompt(e))),
                }
            }
            request_messages.extend(messages.iter().cloned());

            let turn = match self
                .llm
                .complete(CompletionRequest::new(request_messages).with_tools(specs.clone()))
                .await
            {
                Ok(turn) => turn,
                Err(e) => return Err((messages, AgentError::Llm(e))),
            };
            let calls = turn.tool_calls.clone();
            messages.push(turn.into_message().with_name(self.name.clone()));

            if calls.is_empty() {
                info!(agent = %self.name, thread_id = %config.thread_id, steps = step + 1, "agent finished");
                let new_messages = messages[start..].to_vec();
                return Ok(AgentRun {
                    messages,
                    new_messages,
                });
            }

            for call in calls {
                let content = match self.tools.get(&call.name) {
                    None => {
                        warn!(agent = %self.name, tool = %call.name, "model called an unknown tool");
                        format!(
                            "Error: {} is not a valid tool, try one of [{}].",
                            call.name,
                            self.tools.names().join(", ")
                        )
                    }
                    Some(tool) => {
                        let ctx = ToolContext {
                            config: config.clone(),
                            store: self.store.clone(),
                            messages: messages.clone(),
                        };
                        debug!(agent = %self.name, tool = %call.name, "calling tool");
                        match tool.call(call.arguments.clone(), &ctx).await {
                            Ok(output) => output,
                            Err(e) => {
                                warn!(agent = %self.name, tool = %call.name, error = %e, "tool failed");
                                format!("Error: {}\n Please fix your mistakes.", e)
                            }
                        }
                    }
                };
                messages.push(ChatMessage::tool(call.id, call.name, content));
            }
        }

        warn!(agent = %self.name, limit = self.max_steps, "step limit reached");
        Err((
            messages,
            AgentError::RecursionLimit {
                agent: self.name.clone(),
                limit: self.max_steps,
            },
        ))
    }
}
