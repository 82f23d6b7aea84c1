//! Planner that learns from past plan outcomes kept in a SQLite store.

use std::path::Path;
use std::sync::Arc;

use agent::{
    make_planning_episode, InMemorySaver, ManageMemoryTool, ReactAgent, RunConfig,
    SearchMemoryTool, StaticPrompt,
};
use anyhow::Result;
use memory_core::{MemoryStore, Namespace};

use super::{ask, say};
use crate::display::{banner, is_quit, print_memories, read_line};
use crate::setup::Runtime;

pub const PLANNER_NAMESPACE: &str = "planner_episodes";

const PROMPT: &str = "You are a planning agent with episodic memory of plans and their outcomes.

Your memory holds the plans you generated, whether each was approved or rejected, the feedback
on rejected plans, and when each happened. Treat these episodes as examples.

When asked to store a plan outcome, save it with manage_memory (timestamp, plan, approval status,
feedback) and answer \"Plan outcome stored successfully.\"
When asked to create a plan, first search your memory for similar episodes, follow what was
approved, avoid what was rejected, and give a detailed step-by-step plan.
When asked about your planning history, search your memory and summarize the patterns.";

const EXAMPLES: &[(&str, bool, &str)] = &[
    (
        "Task 1: Write Python script for data processing\nTask 2: Test the script\nTask 3: Deploy to production",
        false,
        "Missing documentation step and error handling",
    ),
    (
        "Task 1: Write Python script for data processing\nTask 2: Add error handling\nTask 3: Write documentation\nTask 4: Test the script\nTask 5: Deploy to production",
        true,
        "",
    ),
    (
        "Task 1: Create database schema\nTask 2: Implement API endpoints\nTask 3: Deploy",
        false,
        "Missing testing and security considerations",
    ),
    (
        "Task 1: Design database schema\nTask 2: Implement API endpoints with authentication\nTask 3: Write unit tests\nTask 4: Security review\nTask 5: Deploy to staging\nTask 6: Deploy to production",
        true,
        "",
    ),
];

const QUERIES: &[&str] = &[
    "Create a plan for building a web application with user authentication",
    "Search your memory for patterns in approved vs rejected plans",
    "Based on your planning episodes, what makes a good plan?",
    "Show me examples of plans that were rejected and why",
];

fn store_prompt(plan: &str, approved: bool, feedback: &str) -> Result<String> {
    let episode = make_planning_episode(plan, approved, feedback);
    Ok(format!(
        "Store this plan outcome in your memory: {}",
        serde_json::to_string(&episode)?
    ))
}

pub async fn run(rt: &Runtime, interactive: bool, db: &Path) -> Result<()> {
    let store = rt.sqlite_store(db).await?;
    let namespace = Namespace::new([PLANNER_NAMESPACE])?;
    let agent = ReactAgent::builder("episodic_planner", Arc::clone(&rt.llm))
        .prompt(StaticPrompt::new(PROMPT))
        .tool(ManageMemoryTool::new(namespace.clone()))
        .tool(SearchMemoryTool::new(namespace.clone()))
        .store(store.clone())
        .checkpointer(Arc::new(InMemorySaver::new()))
        .build()?;

    if interactive {
        return interactive_loop(&agent, store.as_ref(), &namespace).await;
    }

    banner("Episodic planner");
    println!("Store: {}", db.display());
    let config = RunConfig::new("planner-episodic-demo");
    for (i, (plan, approved, feedback)) in EXAMPLES.iter().enumerate() {
        println!(
            "\nPlan {} ({}):\n{}",
            i + 1,
            if *approved { "APPROVED" } else { "REJECTED" },
            plan
        );
        if !feedback.is_empty() {
            println!("Feedback: {}", feedback);
        }
        println!("AI: {}", ask(&agent, &config, &store_prompt(plan, *approved, feedback)?).await?);
    }

    println!("\nFew-shot recall");
    for query in QUERIES {
        println!();
        say(&agent, &config, query).await?;
    }
    print_memories(store.as_ref(), &namespace, "Planning episodes", 100).await?;
    Ok(())
}

async fn interactive_loop(agent: &ReactAgent, store: &dyn MemoryStore, namespace: &Namespace) -> Result<()> {
    banner("Interactive episodic planner");
    println!("Commands: create, memory, query, list, quit");
    let user_id = read_line("Enter your user ID (or press Enter for 'interactive_user'): ")
        .await?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "interactive_user".to_string());
    let config = RunConfig::new(format!("planner-episodic-{}", user_id));

    while let Some(command) = read_line("\nCommand (create/memory/query/list/quit): ").await? {
        let command = command.to_lowercase();
        if is_quit(&command) {
            break;
        }
        match command.as_str() {
            "create" => {
                let Some(task) = read_line("Describe the task you need a plan for: ").await? else {
                    break;
                };
                if task.is_empty() {
                    continue;
                }
                let plan = ask(
                    agent,
                    &config,
                    &format!(
                        "Create a detailed plan for: {}. First search your memory for similar plans and learn from them.",
                        task
                    ),
                )
                .await?;
                println!("AI: {}", plan);

                let approved = read_line("\nWas this plan approved? (y/n): ")
                    .await?
                    .map(|a| a.eq_ignore_ascii_case("y"))
                    .unwrap_or(false);
                let feedback = if approved {
                    String::new()
                } else {
                    read_line("What feedback would you give? ").await?.unwrap_or_default()
                };
                let stored = ask(agent, &config, &store_prompt(&plan, approved, &feedback)?).await?;
                println!("Plan outcome stored: {}", stored);
            }
            "memory" => {
                if let Some(query) = read_line("Search your planning episodes for: ").await? {
                    if !query.is_empty() {
                        let text = format!("Search your memory for planning episodes related to: {}", query);
                        println!("AI: {}", ask(agent, &config, &text).await?);
                    }
                }
            }
            "query" => {
                if let Some(query) = read_line("Ask about planning (e.g. 'What makes a good plan?'): ").await? {
                    if !query.is_empty() {
                        println!("AI: {}", ask(agent, &config, &query).await?);
                    }
                }
            }
            "list" => {
                print_memories(store, namespace, "Planning episodes", 100).await?;
            }
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }
    println!("Goodbye!");
    Ok(())
}
