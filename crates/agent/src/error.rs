use thiserror::Error;

/// Errors that stop an agent run.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent {agent} reached the step limit ({limit}) without a final answer")]
    RecursionLimit { agent: String, limit: usize },

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("LLM call failed: {0}")]
    Llm(#[source] anyhow::Error),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[source] anyhow::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[source] anyhow::Error),
}

/// Errors a tool reports back to the model as an `Error: ...` tool message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("{0}")]
    InvalidAction(String),

    #[error("Content does not match schema: {0}")]
    Schema(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}
