//! Supervisor: a [`ReactAgent`] whose extra tools hand the conversation to member agents.

use std::sync::Arc;

use llm_client::LlmClient;
use memory_core::MemoryStore;
use prompt::ChatMessage;

use crate::checkpoint::Checkpointer;
use crate::prompt_source::{PromptSource, StaticPrompt};
use crate::react::{AgentRun, ReactAgent, ReactAgentBuilder};
use crate::tool::{HandoffTool, Tool};
use crate::{AgentError, RunConfig};

pub const SUPERVISOR_NAME: &str = "supervisor";

fn default_prompt(members: &[Arc<ReactAgent>]) -> String {
    let mut text = String::from(
        "You are a team supervisor. Delegate each request to the best suited agent \
         using its transfer tool, then answer the user with the result.\n\nAgents:\n",
    );
    for agent in members {
        match agent.description() {
            Some(d) => text.push_str(&format!("- {}: {}\n", agent.name(), d)),
            None => text.push_str(&format!("- {}\n", agent.name())),
        }
    }
    text
}

/// Routes work to member agents through `transfer_to_<name>` tools.
pub struct Supervisor {
    agent: ReactAgent,
    members: Vec<Arc<ReactAgent>>,
}

pub struct SupervisorBuilder {
    inner: ReactAgentBuilder,
    members: Vec<Arc<ReactAgent>>,
    prompt_set: bool,
}

impl SupervisorBuilder {
    /// Replaces the default prompt listing the members.
    pub fn prompt(mut self, prompt: impl PromptSource + 'static) -> Self {
        self.inner = self.inner.prompt(prompt);
        self.prompt_set = true;
        self
    }

    /// Extra tool besides the hand-off tools.
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.inner = self.inner.tool(tool);
        self
    }

    pub fn store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.inner = self.inner.store(store);
        self
    }

    pub fn checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.inner = self.inner.checkpointer(checkpointer);
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.inner = self.inner.max_steps(max_steps);
        self
    }

    pub fn build(self) -> Result<Supervisor, AgentError> {
        let mut inner = self.inner;
        if !self.prompt_set {
            inner = inner.prompt(StaticPrompt::new(default_prompt(&self.members)));
        }
        for member in &self.members {
            inner = inner.tool(HandoffTool::new(Arc::clone(member)));
        }
        Ok(Supervisor {
            agent: inner.build()?,
            members: self.members,
        })
    }
}

impl Supervisor {
    pub fn builder(llm: Arc<dyn LlmClient>, members: Vec<Arc<ReactAgent>>) -> SupervisorBuilder {
        SupervisorBuilder {
            inner: ReactAgent::builder(SUPERVISOR_NAME, llm),
            members,
            prompt_set: false,
        }
    }

    /// Supervisor with the default prompt and no store or checkpointer.
    pub fn new(llm: Arc<dyn LlmClient>, members: Vec<Arc<ReactAgent>>) -> Result<Self, AgentError> {
        Self::builder(llm, members).build()
    }

    pub fn members(&self) -> &[Arc<ReactAgent>] {
        &self.members
    }

    pub fn agent(&self) -> &ReactAgent {
        &self.agent
    }

    pub async fn invoke(
        &self,
        input: Vec<ChatMessage>,
        config: &RunConfig,
    ) -> Result<AgentRun, AgentError> {
        self.agent.invoke(input, config).await
    }
}
