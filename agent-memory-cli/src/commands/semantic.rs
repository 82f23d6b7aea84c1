//! Semantic memory: facts and preferences recalled across threads.

use std::sync::Arc;

use agent::{InMemorySaver, ManageMemoryTool, ReactAgent, RunConfig, SearchMemoryTool, StaticPrompt};
use anyhow::Result;
use memory_core::{MemoryStore, Namespace};

use super::{ask, say};
use crate::display::{banner, is_quit, print_memories, read_line};
use crate::setup::Runtime;

const PROMPT: &str = "You are a helpful assistant with semantic memory.

Remember important information from conversations: user preferences, facts and context.
Store new information with manage_memory, look things up with search_memory, and update
or delete memories that are outdated. Recall user preferences across conversations.";

fn build(rt: &Runtime, store: Arc<dyn MemoryStore>, namespace: &Namespace) -> Result<ReactAgent> {
    Ok(ReactAgent::builder("semantic_assistant", Arc::clone(&rt.llm))
        .prompt(StaticPrompt::new(PROMPT))
        .tool(ManageMemoryTool::new(namespace.clone()))
        .tool(SearchMemoryTool::new(namespace.clone()))
        .store(store)
        .checkpointer(Arc::new(InMemorySaver::new()))
        .build()?)
}

pub async fn run(rt: &Runtime, interactive: bool) -> Result<()> {
    let store = rt.in_memory_store();
    let namespace = Namespace::new(["memories"])?;
    let agent = build(rt, store.clone(), &namespace)?;
    if interactive {
        return interactive_loop(&agent, store.as_ref(), &namespace).await;
    }

    banner("Semantic memory");
    let prefs = RunConfig::new("user-preferences");
    println!("\n1. Storing user preferences");
    say(&agent, &prefs, "I prefer dark mode for my applications and I'm a software developer.").await?;
    println!("\n2. Same thread");
    say(&agent, &prefs, "What do you remember about my preferences?").await?;

    let fresh = RunConfig::new("new-conversation");
    println!("\n3. New thread");
    say(&agent, &fresh, "Hello! Do you remember anything about me?").await?;
    println!("\n4. More information");
    say(&agent, &fresh, "I also love coffee and work with Python and JavaScript.").await?;
    println!("\n5. Specific question");
    say(&agent, &fresh, "What programming languages do I work with?").await?;

    print_memories(store.as_ref(), &namespace, "Stored memories", 100).await?;
    Ok(())
}

async fn interactive_loop(agent: &ReactAgent, store: &dyn MemoryStore, namespace: &Namespace) -> Result<()> {
    banner("Interactive semantic memory");
    println!("Type 'quit' to exit, 'memories' to see stored memories.");
    let config = RunConfig::new("interactive-session");
    while let Some(input) = read_line("\nYou: ").await? {
        if is_quit(&input) {
            break;
        }
        if input.eq_ignore_ascii_case("memories") {
            print_memories(store, namespace, "Stored memories", 100).await?;
            continue;
        }
        if input.is_empty() {
            continue;
        }
        println!("AI: {}", ask(agent, &config, &input).await?);
    }
    println!("Goodbye!");
    Ok(())
}
