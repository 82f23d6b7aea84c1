//! Background memory formation: the conversation is processed after it ends.

use std::sync::Arc;
use std::time::Duration;

use agent::RunConfig;
use anyhow::Result;
use memory_core::Namespace;
use memory_manager::{MemoryStoreManager, ReflectionExecutor, ReflectionRequest};
use prompt::ChatMessage;
use tracing::info;

use crate::cli::BackgroundScenario;
use crate::display::{banner, print_memories};
use crate::setup::Runtime;

const MAX_STEPS: usize = 10;
const PAUSE_BETWEEN_MESSAGES: Duration = Duration::from_secs(2);
const WAIT_BUFFER: Duration = Duration::from_secs(5);

fn script(scenario: BackgroundScenario) -> &'static [&'static str] {
    match scenario {
        BackgroundScenario::Chat => &[
            "Hi! I'm Alice, and I'm a software engineer.",
            "I love working with Python and machine learning.",
            "I have a dog named Max who is a Golden Retriever.",
            "I'm currently working on a project about natural language processing.",
            "My favorite hobby is hiking in the mountains on weekends.",
        ],
        BackgroundScenario::Simple => &[
            "Hello! I'm testing delayed memory processing. My name is John and I work as a data scientist.",
        ],
        BackgroundScenario::Debug => &[
            "My name is Sarah.",
            "I work as a teacher.",
            "I have two cats named Whiskers and Mittens.",
        ],
    }
}

pub async fn run(rt: &Runtime, scenario: BackgroundScenario, delay_secs: u64) -> Result<()> {
    let delay = Duration::from_secs(delay_secs);
    banner(&format!("Background memory ({:?})", scenario));
    println!("Delay: {}s after the last message", delay_secs);

    let store = rt.in_memory_store();
    let namespace = Namespace::new(["memories"])?;
    let manager = MemoryStoreManager::new(Arc::clone(&rt.llm), store.clone(), namespace.clone());
    let executor = ReflectionExecutor::new(Arc::new(manager));

    let mut history = Vec::new();
    let messages = script(scenario);
    for (i, message) in messages.iter().enumerate() {
        println!("\n--- Message {} ---", i + 1);
        println!("User: {}", message);
        let reply = rt.llm.invoke(message).await?;
        println!("Assistant: {}", reply);
        history.push(ChatMessage::user(*message));
        history.push(ChatMessage::assistant(reply));
        info!(messages = history.len(), "conversation history updated");

        if scenario == BackgroundScenario::Chat {
            print_memories(store.as_ref(), &namespace, "Memories before processing", 100).await?;
            if i + 1 < messages.len() {
                tokio::time::sleep(PAUSE_BETWEEN_MESSAGES).await;
            }
        }
    }

    if scenario == BackgroundScenario::Debug {
        println!("\nConversation history ({} messages):", history.len());
        for (i, m) in history.iter().enumerate() {
            println!("  {}. {:?}: {}", i + 1, m.role, m.content);
        }
    }
    if scenario == BackgroundScenario::Simple {
        print_memories(store.as_ref(), &namespace, "Memories before delay", 100).await?;
    }

    println!("\nSubmitting {} messages for processing in {}s", history.len(), delay_secs);
    executor
        .submit(
            ReflectionRequest {
                messages: history,
                max_steps: MAX_STEPS,
                config: RunConfig::new("background-demo"),
            },
            delay,
        )
        .await;

    println!("Waiting {}s (delay + buffer)...", (delay + WAIT_BUFFER).as_secs());
    tokio::time::sleep(delay + WAIT_BUFFER).await;
    if executor.pending().await > 0 {
        println!("Processing still running, waiting for it to finish...");
    }
    let changes = executor.flush().await;
    println!("Applied {} memory changes", changes.len());

    print_memories(store.as_ref(), &namespace, "Memories after processing", 100).await?;
    executor.shutdown().await;
    Ok(())
}
