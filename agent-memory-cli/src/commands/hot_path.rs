//! Memories read into the prompt and written by the agent while it chats.

use std::sync::Arc;

use agent::{InMemorySaver, ManageMemoryTool, MemoryPrompt, ReactAgent, RunConfig};
use anyhow::Result;
use memory_core::Namespace;

use super::say;
use crate::display::{banner, print_memories};
use crate::setup::Runtime;

pub async fn run(rt: &Runtime) -> Result<()> {
    banner("Hot-path memory");
    let store = rt.in_memory_store();
    let namespace = Namespace::new(["memories"])?;
    let agent = ReactAgent::builder("assistant", Arc::clone(&rt.llm))
        .prompt(MemoryPrompt::new("assistant", namespace.clone()))
        .tool(ManageMemoryTool::new(namespace.clone()))
        .store(store.clone())
        .checkpointer(Arc::new(InMemorySaver::new()))
        .build()?;

    let thread_a = RunConfig::new("thread-a");
    say(&agent, &thread_a, "Know which display mode I prefer?").await?;
    say(&agent, &thread_a, "dark. Remember that.").await?;

    println!("\nNew thread: only saved memories carry over.");
    let thread_b = RunConfig::new("thread-b");
    say(&agent, &thread_b, "Hey there. Do you remember me? What are my preferences?").await?;

    print_memories(store.as_ref(), &namespace, "Stored memories", 100).await?;
    Ok(())
}
