//! Tools the model can call.
//!
//! A [`Tool`] describes itself with a [`ToolSpec`] (name, description, JSON schema) and runs
//! against a [`ToolContext`] carrying the run config, the agent's store and the conversation.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use memory_core::MemoryStore;
use prompt::{ChatMessage, ToolSpec};
use serde_json::Value;

use crate::{AgentError, RunConfig, ToolError};

mod feedback;
mod handoff;
mod memory;

pub use feedback::{HumanFeedback, HumanFeedbackTool, LineFeedback, ScriptedFeedback, StdinFeedback};
pub use handoff::HandoffTool;
pub use memory::{ManageMemoryTool, SearchMemoryTool};

/// What a tool sees while running.
#[derive(Clone)]
pub struct ToolContext {
    pub config: RunConfig,
    pub store: Option<Arc<dyn MemoryStore>>,
    /// Conversation so far, including the assistant turn that issued the call.
    pub messages: Vec<ChatMessage>,
}

impl ToolContext {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            store: None,
            messages: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub(crate) fn require_store(&self) -> Result<&Arc<dyn MemoryStore>, ToolError> {
        self.store.as_ref().ok_or(ToolError::NotConfigured("memory store"))
    }
}

/// A callable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    /// Runs the tool. The returned text becomes the tool message content; an error
    /// becomes an `Error: ...` tool message.
    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<String>;
}

/// Tools of one agent, unique by name, in registration order.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tool: Arc<dyn Tool>) -> Result<(), AgentError> {
        if self.get(tool.name()).is_some() {
            return Err(AgentError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

type ToolFn = dyn Fn(&Value) -> Result<String, ToolError> + Send + Sync;

/// Tool backed by a plain function over its JSON arguments.
#[derive(Clone)]
pub struct FunctionTool {
    spec: ToolSpec,
    func: Arc<ToolFn>,
}

impl FunctionTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        func: F,
    ) -> Self
    where
        F: Fn(&Value) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            spec: ToolSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn spec(&self) -> ToolSpec {
        self.spec.clone()
    }

    async fn call(&self, args: Value, _ctx: &ToolContext) -> Result<String> {
        Ok((self.func)(&args)?)
    }
}

/// Reads a required string argument.
pub fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "'{}' must be a string, got {}",
            name, other
        ))),
        None => Err(ToolError::MissingArgument(name.to_string())),
    }
}

/// Reads a required number argument; numeric strings are accepted.
pub fn required_f64(args: &Value, name: &str) -> Result<f64, ToolError> {
    match args.get(name) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ToolError::InvalidArguments(format!("'{}' is not a finite number", name))),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            ToolError::InvalidArguments(format!("'{}' must be a number, got {:?}", name, s))
        }),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "'{}' must be a number, got {}",
            name, other
        ))),
        None => Err(ToolError::MissingArgument(name.to_string())),
    }
}

/// Reads an optional non-negative integer argument.
pub(crate) fn optional_usize(args: &Value, name: &str) -> Result<Option<usize>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| ToolError::InvalidArguments(format!("'{}' must be a non-negative integer", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo(name: &str) -> Arc<dyn Tool> {
        Arc::new(FunctionTool::new(name, "Echo.", json!({"type": "object"}), |args| {
            Ok(args.to_string())
        }))
    }

    #[test]
    fn test_toolset_rejects_duplicates() {
        let mut tools = ToolSet::new();
        tools.add(echo("a")).unwrap();
        tools.add(echo("b")).unwrap();
        assert!(matches!(tools.add(echo("a")), Err(AgentError::DuplicateTool(n)) if n == "a"));
        assert_eq!(tools.names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_function_tool_call() {
        let tool = FunctionTool::new("add", "Add.", json!({}), |args| {
            Ok((required_f64(args, "a")? + required_f64(args, "b")?).to_string())
        });
        let ctx = ToolContext::new(RunConfig::new("t"));
        assert_eq!(tool.call(json!({"a": 3, "b": "5"}), &ctx).await.unwrap(), "8");
        let err = tool.call(json!({"a": 3}), &ctx).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ToolError>(),
            Some(&ToolError::MissingArgument("b".to_string()))
        );
    }

    #[test]
    fn test_required_str() {
        let args = json!({"q": "x", "n": 1});
        assert_eq!(required_str(&args, "q").unwrap(), "x");
        assert!(matches!(required_str(&args, "n"), Err(ToolError::InvalidArguments(_))));
    }
}
