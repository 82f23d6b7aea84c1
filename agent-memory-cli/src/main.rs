//! agent-memory CLI: memory demos for agents. Model and embedding settings come from env.

use agent_memory_cli::commands;
use agent_memory_cli::logger::{init_tracing, log_file_path};
use agent_memory_cli::setup::Runtime;
use agent_memory_cli::{Cli, Commands};
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(&log_file_path())?;

    let cli = Cli::parse();

    if let Commands::Memories { db, namespace } = &cli.command {
        return commands::memories::run(db, namespace.as_deref()).await;
    }

    let rt = Runtime::from_env()?;
    match cli.command {
        Commands::HotPath => commands::hot_path::run(&rt).await,
        Commands::Semantic { interactive } => commands::semantic::run(&rt, interactive).await,
        Commands::Episodic { interactive } => commands::episodic::run(&rt, interactive).await,
        Commands::Planner { interactive, db } => commands::planner::run(&rt, interactive, &db).await,
        Commands::Plan { query } => commands::plan::run(&rt, &query).await,
        Commands::Background {
            scenario,
            delay_secs,
        } => commands::background::run(&rt, scenario, delay_secs).await,
        Commands::Supervisor { storage_dir } => commands::supervisor::run(&rt, &storage_dir).await,
        Commands::Shared => commands::shared::run(&rt).await,
        Commands::Memories { .. } => Ok(()),
    }
}
