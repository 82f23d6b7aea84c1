//! Integration tests for the planning agent with scripted human feedback.
//!
//! **BDD style**: Given a planner and a human who first rejects then approves,
//! when the planner runs, then it revises the plan and returns the approved one.

mod common;

use std::sync::Arc;

use agent::{is_approval, planning_agent, RunConfig, ScriptedFeedback};
use anyhow::Result;
use common::{call, reply, ScriptedLlm};
use prompt::{ChatMessage, MessageRole};
use serde_json::json;

/// **Test: rejection feedback reaches the model; approval ends the loop.**
#[tokio::test]
async fn planner_revises_until_approved() -> Result<()> {
    let v1 = "Task 1: [For Coding Agent] Write a scraper";
    let v2 = "Task 1: [For Coding Agent] Write a scraper\nTask 2: [For Terminal Agent] Run its tests";
    let llm = Arc::new(ScriptedLlm::new(vec![
        call("c1", "human_feedback", json!({"plan": v1})),
        call("c2", "human_feedback", json!({"plan": v2})),
        reply(v2),
    ]));
    let feedback = Arc::new(ScriptedFeedback::new(["no, add a testing step", "yes"]));
    let planner = planning_agent(llm, feedback.clone())?;

    let run = planner
        .invoke(vec![ChatMessage::user("Build a web scraper")], &RunConfig::new("p1"))
        .await?;

    assert_eq!(run.last_reply(), Some(v2));
    assert_eq!(feedback.asked().await, vec![v1, v2]);

    let answers: Vec<&str> = run
        .messages
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .map(|m| m.content.as_str())
        .collect();
    assert!(!is_approval(answers[0]));
    assert!(is_approval(answers[1]));
    Ok(())
}
