//! One module per subcommand.

pub mod background;
pub mod episodic;
pub mod hot_path;
pub mod memories;
pub mod plan;
pub mod planner;
pub mod semantic;
pub mod shared;
pub mod supervisor;

use agent::{ReactAgent, RunConfig};
use anyhow::Result;
use prompt::ChatMessage;

/// Sends one user message and returns the final reply.
pub(crate) async fn ask(agent: &ReactAgent, config: &RunConfig, text: &str) -> Result<String> {
    let run = agent.invoke(vec![ChatMessage::user(text)], config).await?;
    Ok(run.last_reply().unwrap_or_default().to_string())
}

/// Like [`ask`] but prints the exchange.
pub(crate) async fn say(agent: &ReactAgent, config: &RunConfig, text: &str) -> Result<String> {
    println!("User: {}", text);
    let reply = ask(agent, config, text).await?;
    println!("AI: {}", reply);
    Ok(reply)
}
