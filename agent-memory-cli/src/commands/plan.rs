//! Plan drafting with human approval on stdin.

use std::sync::Arc;

use agent::{is_approval, planning_agent, RunConfig, StdinFeedback};
use anyhow::Result;
use prompt::{ChatMessage, MessageRole};

use crate::display::banner;
use crate::setup::Runtime;

pub async fn run(rt: &Runtime, query: &str) -> Result<()> {
    banner("Planning agent");
    let planner = planning_agent(Arc::clone(&rt.llm), Arc::new(StdinFeedback::stdin()))?;
    let run = planner
        .invoke(vec![ChatMessage::user(query)], &RunConfig::new("planning"))
        .await?;

    let approved = run
        .messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Tool)
        .map(|m| is_approval(&m.content))
        .unwrap_or(false);
    println!("\nFinal plan{}:", if approved { " (approved)" } else { "" });
    println!("{}", run.last_reply().unwrap_or_default());
    Ok(())
}
