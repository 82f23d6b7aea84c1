//! Human-in-the-loop approval.
//!
//! The `human_feedback` tool blocks the agent loop until a [`HumanFeedback`] source answers.
//! The answer is returned to the model verbatim; the planner prompt tells it how to read
//! approvals and rejections.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use prompt::ToolSpec;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::info;

use super::{required_str, Tool, ToolContext};

pub const HUMAN_FEEDBACK_TOOL_NAME: &str = "human_feedback";
const QUESTION: &str = "Do you approve the plan?";

/// Source of human answers.
#[async_trait]
pub trait HumanFeedback: Send + Sync {
    async fn ask(&self, question: &str, plan: &str) -> Result<String>;
}

/// Asks on stdout and reads the answer as one line from `reader`.
///
/// The reader lives as long as the feedback source, so lines that arrive together
/// are answered one per question.
pub struct LineFeedback<R> {
    reader: Mutex<R>,
}

/// [`LineFeedback`] over the process stdin.
pub type StdinFeedback = LineFeedback<BufReader<Stdin>>;

impl<R> LineFeedback<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

impl LineFeedback<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> HumanFeedback for LineFeedback<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn ask(&self, question: &str, plan: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("\n{}\n\n{}\n\nYour answer: ", plan, question).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            anyhow::bail!("input closed while waiting for feedback");
        }
        Ok(line.trim().to_string())
    }
}

/// Replays prepared answers in order; for demos and tests.
#[derive(Debug, Default)]
pub struct ScriptedFeedback {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedFeedback {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Plans shown so far.
    pub async fn asked(&self) -> Vec<String> {
        self.asked.lock().await.clone()
    }
}

#[async_trait]
impl HumanFeedback for ScriptedFeedback {
    async fn ask(&self, _question: &str, plan: &str) -> Result<String> {
        self.asked.lock().await.push(plan.to_string());
        self.answers
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted feedback left"))
    }
}

/// `human_feedback(plan)`: shows the plan to a human and returns the answer.
#[derive(Clone)]
pub struct HumanFeedbackTool {
    source: Arc<dyn HumanFeedback>,
}

impl HumanFeedbackTool {
    pub fn new(source: Arc<dyn HumanFeedback>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for HumanFeedbackTool {
    fn name(&self) -> &str {
        HUMAN_FEEDBACK_TOOL_NAME
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: HUMAN_FEEDBACK_TOOL_NAME.to_string(),
            description: "Show the plan to a human and wait for approval or requested changes."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {"plan": {"type": "string", "description": "The full plan text"}},
                "required": ["plan"]
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<String> {
        let plan = required_str(&args, "plan")?;
        let answer = self.source.ask(QUESTION, plan).await?;
        info!(thread_id = %ctx.config.thread_id, answer = %answer, "human feedback received");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunConfig;

    #[tokio::test]
    async fn test_scripted_feedback_in_order() {
        let feedback = Arc::new(ScriptedFeedback::new(["add tests", "yes"]));
        let tool = HumanFeedbackTool::new(feedback.clone());
        let ctx = ToolContext::new(RunConfig::new("t"));

        assert_eq!(tool.call(json!({"plan": "v1"}), &ctx).await.unwrap(), "add tests");
        assert_eq!(tool.call(json!({"plan": "v2"}), &ctx).await.unwrap(), "yes");
        assert!(tool.call(json!({"plan": "v3"}), &ctx).await.is_err());
        assert_eq!(feedback.asked().await, vec!["v1", "v2", "v3"]);
    }

    #[tokio::test]
    async fn test_line_feedback_answers_buffered_lines_in_order() {
        let feedback = LineFeedback::new(&b"add a testing task\nyes\n"[..]);

        assert_eq!(feedback.ask("ok?", "v1").await.unwrap(), "add a testing task");
        assert_eq!(feedback.ask("ok?", "v2").await.unwrap(), "yes");
        assert!(feedback.ask("ok?", "v3").await.is_err());
    }
}
