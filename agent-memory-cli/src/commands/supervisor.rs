//! Supervisor over math, research and writing agents, each with a private namespace,
//! with snapshots of all namespaces saved to disk.

use std::path::Path;
use std::sync::Arc;

use agent::{InMemorySaver, ManageMemoryTool, MemoryPrompt, ReactAgent, RunConfig, Supervisor, Tool};
use anyhow::Result;
use memory_core::{MemoryStore, Namespace};
use memory_persistence::{export_sqlite, restore, SnapshotStore};
use prompt::ChatMessage;
use tracing::warn;

use crate::display::{banner, preview, print_memories, PREVIEW_CHARS};
use crate::setup::Runtime;
use crate::tools;

const AGENT_NAMESPACES: &[(&str, &str)] = &[
    ("math_memories", "Math Agent"),
    ("research_memories", "Research Agent"),
    ("writing_memories", "Writing Agent"),
    ("supervisor_memories", "Supervisor"),
];

fn member(
    rt: &Runtime,
    store: Arc<dyn MemoryStore>,
    checkpointer: Arc<InMemorySaver>,
    name: &str,
    role: &str,
    namespace: &str,
    domain_tools: Vec<Arc<dyn Tool>>,
) -> Result<Arc<ReactAgent>> {
    let namespace = Namespace::new([namespace])?;
    let mut builder = ReactAgent::builder(name, Arc::clone(&rt.llm))
        .description(role)
        .prompt(MemoryPrompt::new(role, namespace.clone()).private())
        .store(store)
        .checkpointer(checkpointer);
    for tool in domain_tools {
        builder = builder.tool_arc(tool);
    }
    Ok(Arc::new(builder.tool(ManageMemoryTool::new(namespace)).build()?))
}

pub async fn run(rt: &Runtime, storage_dir: &Path) -> Result<()> {
    banner("Supervisor with external memory storage");
    let store = rt.in_memory_store();
    let snapshots = SnapshotStore::new(storage_dir).await?;
    println!("Storage location: {}", snapshots.dir().display());

    let existing = snapshots.load().await?;
    if !existing.is_empty() {
        let restored = restore(store.as_ref(), &existing).await?;
        println!("Restored {} memories from {}", restored, snapshots.snapshot_path().display());
    }

    let checkpointer = Arc::new(InMemorySaver::new());
    let math = member(
        rt,
        store.clone(),
        checkpointer.clone(),
        "math_expert",
        "math expert specializing in calculations and problem-solving",
        "math_memories",
        vec![Arc::new(tools::add()), Arc::new(tools::multiply()), Arc::new(tools::divide())],
    )?;
    let research = member(
        rt,
        store.clone(),
        checkpointer.clone(),
        "research_expert",
        "research expert specializing in information gathering and analysis",
        "research_memories",
        vec![Arc::new(tools::web_search()), Arc::new(tools::company_info())],
    )?;
    let writing = member(
        rt,
        store.clone(),
        checkpointer.clone(),
        "writing_expert",
        "writing expert specializing in content creation and editing",
        "writing_memories",
        vec![Arc::new(tools::create_outline()), Arc::new(tools::grammar_check())],
    )?;

    let supervisor_ns = Namespace::new(["supervisor_memories"])?;
    let supervisor = Supervisor::builder(Arc::clone(&rt.llm), vec![math, research, writing])
        .prompt(
            MemoryPrompt::new(
                "supervisor specializing in coordination and routing decisions",
                supervisor_ns.clone(),
            )
            .private(),
        )
        .tool(ManageMemoryTool::new(supervisor_ns))
        .store(store.clone())
        .checkpointer(checkpointer)
        .build()?;

    let namespaces: Vec<Namespace> = AGENT_NAMESPACES
        .iter()
        .map(|(ns, _)| Namespace::new([*ns]))
        .collect::<Result<_, _>>()?;

    let demo = RunConfig::new("supervisor-demo");
    let questions = [
        "What is 15 * 23 + 47?",
        "Can you research information about Meta's employee count?",
        "Create an outline for a presentation about AI in business.",
    ];
    for (i, question) in questions.iter().enumerate() {
        println!("\n{}. User: {}", i + 1, question);
        let run = supervisor.invoke(vec![ChatMessage::user(*question)], &demo).await?;
        println!("Response: {}", run.last_reply().unwrap_or_default());
    }

    println!("\n4. Saving memories");
    let report = snapshots.save(store.as_ref(), &namespaces).await?;
    print_report(&report);

    println!("\n5. Recall in a new thread");
    let recall = RunConfig::new("supervisor-recall");
    let run = supervisor
        .invoke(
            vec![ChatMessage::user(
                "Do you remember any calculations I asked about? And what was my presentation topic?",
            )],
            &recall,
        )
        .await?;
    println!("Response: {}", run.last_reply().unwrap_or_default());

    println!("\n6. Multi-agent coordination");
    let run = supervisor
        .invoke(
            vec![ChatMessage::user(
                "Calculate the total employees of Meta and Google, then write a brief summary about these companies.",
            )],
            &demo,
        )
        .await?;
    println!("Response: {}", run.last_reply().unwrap_or_default());

    println!("\n7. Final export");
    let report = snapshots.save(store.as_ref(), &namespaces).await?;
    print_report(&report);
    let records = snapshots.load().await?;
    match export_sqlite(&records, snapshots.default_export_path()).await {
        Ok(n) => println!("Exported {} memories to {}", n, snapshots.default_export_path().display()),
        Err(e) => warn!(error = %e, "SQLite export failed"),
    }

    println!("\n8. Memories by agent");
    for (ns, (_, label)) in namespaces.iter().zip(AGENT_NAMESPACES) {
        print_memories(store.as_ref(), ns, &format!("{} memories", label), 100).await?;
    }
    println!("\nSnapshot at {} holds {} records", snapshots.snapshot_path().display(), records.len());
    for (i, record) in records.iter().enumerate() {
        println!(
            "  External {}. {}",
            i + 1,
            preview(&memory_core::content_text(&record.value), PREVIEW_CHARS)
        );
    }
    Ok(())
}

fn print_report(report: &memory_persistence::SaveReport) {
    println!("Saved {} memories to {}", report.total, report.snapshot_path.display());
    println!("Backup: {}", report.backup_path.display());
    for (ns, count) in &report.per_namespace {
        println!("  - {}: {} memories", ns, count);
    }
}
