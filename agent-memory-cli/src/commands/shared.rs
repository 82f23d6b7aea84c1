//! Two agents with private namespaces writing structured entries to a shared workspace.

use std::sync::Arc;

use agent::{
    shared_entry_schema, InMemorySaver, ManageMemoryTool, ReactAgent, RunConfig, SearchMemoryTool,
    StaticPrompt,
};
use anyhow::Result;
use memory_core::{MemoryStore, Namespace};

use super::ask;
use crate::display::{banner, print_memories};
use crate::setup::Runtime;
use crate::tools;

const SHARED: &str = "shared_workspace";

const RESEARCH_PROMPT: &str = "You are a Research Agent that gathers and analyses company information.

Use research_company to collect data. Keep notes about your own methodology and sources in private \
memory with manage_private_memory. Put facts other agents can use in the shared workspace with \
manage_shared_memory, and check search_shared_memory before researching something twice. \
Every entry has a task, the action taken and its result.";

const WRITING_PROMPT: &str = "You are a Writing Agent that creates reports and documents.

Look up research in the shared workspace with search_shared_memory before writing. Keep your style \
and formatting preferences in private memory with manage_private_memory. Leave requests and notes \
for other agents in the shared workspace with manage_shared_memory. Every entry has a task, the \
action taken and its result.";

fn memory_tools(private: &str) -> Result<(ManageMemoryTool, ManageMemoryTool, SearchMemoryTool, SearchMemoryTool)> {
    let private = Namespace::new([private])?;
    let shared = Namespace::new([SHARED])?;
    Ok((
        ManageMemoryTool::new(private.clone())
            .with_name("manage_private_memory")
            .with_schema(shared_entry_schema()),
        ManageMemoryTool::new(shared.clone())
            .with_name("manage_shared_memory")
            .with_schema(shared_entry_schema()),
        SearchMemoryTool::new(shared).with_name("search_shared_memory"),
        SearchMemoryTool::new(private).with_name("search_private_memory"),
    ))
}

fn research_agent(rt: &Runtime, store: Arc<dyn MemoryStore>) -> Result<ReactAgent> {
    let (manage_private, manage_shared, search_shared, search_private) = memory_tools("research_private")?;
    Ok(ReactAgent::builder("research_agent", Arc::clone(&rt.llm))
        .prompt(StaticPrompt::new(RESEARCH_PROMPT))
        .tool(tools::research_company())
        .tool(manage_private)
        .tool(manage_shared)
        .tool(search_shared)
        .tool(search_private)
        .store(store)
        .checkpointer(Arc::new(InMemorySaver::new()))
        .build()?)
}

fn writing_agent(rt: &Runtime, store: Arc<dyn MemoryStore>) -> Result<ReactAgent> {
    let (manage_private, manage_shared, search_shared, search_private) = memory_tools("writing_private")?;
    Ok(ReactAgent::builder("writing_agent", Arc::clone(&rt.llm))
        .prompt(StaticPrompt::new(WRITING_PROMPT))
        .tool(manage_private)
        .tool(manage_shared)
        .tool(search_shared)
        .tool(search_private)
        .store(store)
        .checkpointer(Arc::new(InMemorySaver::new()))
        .build()?)
}

async fn step(agent: &ReactAgent, config: &RunConfig, title: &str, text: &str) -> Result<()> {
    println!("\n{}", title);
    println!("{}", "=".repeat(50));
    let reply = ask(agent, config, text).await?;
    println!("{} response:\n{}", agent.name(), reply);
    Ok(())
}

pub async fn run(rt: &Runtime) -> Result<()> {
    banner("Collaborative agents with private and shared memory");
    let store = rt.in_memory_store();
    let research = research_agent(rt, store.clone())?;
    let writing = writing_agent(rt, store.clone())?;
    let research_thread = RunConfig::new("research-thread");
    let writing_thread = RunConfig::new("writing-thread");

    step(
        &research,
        &research_thread,
        "Step 1: research gathers company information",
        "Research Meta and Apple. Store your research methodology in your private memory and the company facts in shared memory so other agents can use them.",
    )
    .await?;
    step(
        &writing,
        &writing_thread,
        "Step 2: writing uses the shared research",
        "Create a brief comparison report between Meta and Apple using any information available in shared memory. Store your writing preferences in private memory.",
    )
    .await?;
    step(
        &research,
        &research_thread,
        "Step 3: research adds to the shared workspace",
        "Also research Google and add it to our shared workspace. Check if there's any existing shared information first.",
    )
    .await?;
    step(
        &writing,
        &writing_thread,
        "Step 4: writing updates the report",
        "Update the comparison report to include Google. Check shared memory for the latest information.",
    )
    .await?;

    println!("\nStep 5: memory contents");
    for (ns, label) in [
        ("research_private", "Research private memory"),
        ("writing_private", "Writing private memory"),
        (SHARED, "Shared workspace"),
    ] {
        print_memories(store.as_ref(), &Namespace::new([ns])?, label, 100).await?;
    }

    step(
        &writing,
        &writing_thread,
        "Step 6: cross-agent notes",
        "Leave a note in shared memory about what additional information would be helpful for future reports.",
    )
    .await?;
    step(
        &research,
        &research_thread,
        "Step 6: research reads the notes",
        "Check the shared workspace to see what information is available for other agents. What else should I research?",
    )
    .await?;
    Ok(())
}
