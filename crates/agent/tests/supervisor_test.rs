//! Integration tests for `agent::Supervisor`.
//!
//! **BDD style**: Given a supervisor with member agents, when the model calls a
//! `transfer_to_<agent>` tool, then the member runs on the conversation and its reply
//! becomes the tool result.

mod common;

use std::sync::Arc;

use agent::{InMemorySaver, ReactAgent, RunConfig, Supervisor};
use anyhow::Result;
use common::{call, reply, ScriptedLlm};
use prompt::{ChatMessage, MessageRole};
use serde_json::json;

/// **Test: hand-off runs the member and returns its reply to the supervisor.**
#[tokio::test]
async fn handoff_returns_member_reply() -> Result<()> {
    let math_llm = Arc::new(ScriptedLlm::new(vec![reply("2 * 3 = 6")]));
    let math = Arc::new(
        ReactAgent::builder("math_expert", math_llm.clone())
            .description("Solves arithmetic")
            .build()?,
    );
    let research_llm = Arc::new(ScriptedLlm::new(vec![]));
    let research = Arc::new(ReactAgent::builder("research_expert", research_llm.clone()).build()?);

    let llm = Arc::new(ScriptedLlm::new(vec![
        call("c1", "transfer_to_math_expert", json!({})),
        reply("The answer is 6."),
    ]));
    let saver = Arc::new(InMemorySaver::new());
    let supervisor = Supervisor::builder(llm.clone(), vec![math, research])
        .checkpointer(saver.clone())
        .build()?;
    assert_eq!(supervisor.members().len(), 2);

    let run = supervisor
        .invoke(vec![ChatMessage::user("What is 2 * 3?")], &RunConfig::new("s1"))
        .await?;

    assert_eq!(run.last_reply(), Some("The answer is 6."));
    let tool_message = run
        .messages
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("hand-off result");
    assert_eq!(tool_message.content, "2 * 3 = 6");
    assert_eq!(research_llm.requests().len(), 0);

    // Member saw only the user's question, no tool traffic.
    let member_request = &math_llm.requests()[0];
    assert_eq!(member_request.messages.len(), 1);
    assert_eq!(member_request.messages[0].content, "What is 2 * 3?");

    // Supervisor prompt lists the members and their transfer tools are offered.
    let first = &llm.requests()[0];
    assert!(first.messages[0].content.contains("- math_expert: Solves arithmetic"));
    let tool_names: Vec<&str> = first.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tool_names, vec!["transfer_to_math_expert", "transfer_to_research_expert"]);
    Ok(())
}

/// **Test: a failing member is reported back as a tool error.**
#[tokio::test]
async fn failing_member_becomes_tool_error() -> Result<()> {
    let member = Arc::new(ReactAgent::builder("broken", Arc::new(ScriptedLlm::new(vec![]))).build()?);
    let llm = Arc::new(ScriptedLlm::new(vec![
        call("c1", "transfer_to_broken", json!({})),
        reply("Sorry, that failed."),
    ]));
    let supervisor = Supervisor::new(llm, vec![member])?;

    let run = supervisor
        .invoke(vec![ChatMessage::user("help")], &RunConfig::new("s1"))
        .await?;
    assert!(run.messages[2].content.starts_with("Error: "));
    assert_eq!(run.last_reply(), Some("Sorry, that failed."));
    Ok(())
}
