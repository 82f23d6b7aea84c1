//! Episodic memory: every event stored with its timestamp.

use std::sync::Arc;

use agent::{
    make_episode, InMemorySaver, ManageMemoryTool, ReactAgent, RunConfig, SearchMemoryTool,
    StaticPrompt,
};
use anyhow::Result;
use memory_core::{MemoryStore, Namespace};

use super::{ask, say};
use crate::display::{banner, is_quit, print_memories, read_line};
use crate::setup::Runtime;

const PROMPT: &str = "You are an assistant with episodic memory. Each user interaction is stored \
as its own episode with a timestamp and an event description. Use the memory tools to store, \
search and recall episodes. When asked about the past, retrieve and summarize the relevant episodes.";

const EVENTS: &[&str] = &[
    "I had coffee this morning.",
    "I went for a run in the park.",
    "I attended a meeting about project X.",
    "I had lunch with Sarah.",
    "I finished reading a book on AI.",
];

pub async fn run(rt: &Runtime, interactive: bool) -> Result<()> {
    let store = rt.in_memory_store();
    let namespace = Namespace::new(["episodes"])?;
    let agent = ReactAgent::builder("episodic_assistant", Arc::clone(&rt.llm))
        .prompt(StaticPrompt::new(PROMPT))
        .tool(ManageMemoryTool::new(namespace.clone()))
        .tool(SearchMemoryTool::new(namespace.clone()))
        .store(store.clone())
        .checkpointer(Arc::new(InMemorySaver::new()))
        .build()?;

    if interactive {
        return interactive_loop(&agent, store.as_ref(), &namespace).await;
    }

    banner("Episodic memory");
    let config = RunConfig::new("episodic-demo");
    for (i, event) in EVENTS.iter().enumerate() {
        println!("\nEpisode {}: {}", i + 1, event);
        say(&agent, &config, &make_episode(*event).remember_prompt()).await?;
    }

    println!("\nRecall");
    say(&agent, &config, "What did I do after my run?").await?;
    say(&agent, &config, "Summarize my day so far.").await?;

    print_memories(store.as_ref(), &namespace, "All stored episodes", 100).await?;
    Ok(())
}

async fn interactive_loop(agent: &ReactAgent, store: &dyn MemoryStore, namespace: &Namespace) -> Result<()> {
    banner("Interactive episodic memory");
    println!("Each message is stored as an episode with a timestamp.");
    println!("Type 'quit' to exit, 'episodes' to see stored episodes.");
    let config = RunConfig::new("episodic-interactive");
    while let Some(input) = read_line("\nYou: ").await? {
        if is_quit(&input) {
            break;
        }
        if input.eq_ignore_ascii_case("episodes") {
            print_memories(store, namespace, "Stored episodes", 100).await?;
            continue;
        }
        if input.is_empty() {
            continue;
        }
        let episode = make_episode(input);
        println!("AI: {}", ask(agent, &config, &episode.remember_prompt()).await?);
    }
    println!("Goodbye!");
    Ok(())
}
