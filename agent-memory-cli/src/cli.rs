//! CLI parser.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "agent-memory")]
#[command(about = "Memory for AI agents: semantic, episodic and background memory demos", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Agent that reads memories into its prompt and saves new ones while chatting.
    HotPath,
    /// Semantic memory: facts and preferences recalled across threads.
    Semantic {
        #[arg(short, long)]
        interactive: bool,
    },
    /// Episodic memory: each event stored with its timestamp.
    Episodic {
        #[arg(short, long)]
        interactive: bool,
    },
    /// Planner that learns from approved and rejected plans (SQLite-backed store).
    Planner {
        #[arg(short, long)]
        interactive: bool,
        /// Store database file.
        #[arg(long, default_value = "planner_memory.db")]
        db: PathBuf,
    },
    /// Draft a plan for QUERY and loop on human approval from stdin.
    Plan { query: String },
    /// Delayed background memory extraction from a finished conversation.
    Background {
        #[arg(long, value_enum, default_value_t = BackgroundScenario::Simple)]
        scenario: BackgroundScenario,
        #[arg(long, default_value = "30")]
        delay_secs: u64,
    },
    /// Supervisor routing to math, research and writing agents with private memories.
    Supervisor {
        /// Directory for the JSON snapshot, backups and SQLite export.
        #[arg(long, default_value = "./memory_storage")]
        storage_dir: PathBuf,
    },
    /// Research and writing agents collaborating through a shared workspace namespace.
    Shared,
    /// List memories in a SQLite store.
    Memories {
        #[arg(long, default_value = "planner_memory.db")]
        db: PathBuf,
        /// Dotted namespace prefix, e.g. `planner_episodes`.
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackgroundScenario {
    /// Five-message conversation about Alice.
    Chat,
    /// One message, then processing.
    Simple,
    /// Three messages with the full history printed.
    Debug,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_background_options() {
        let cli = Cli::try_parse_from(["agent-memory", "background", "--scenario", "debug", "--delay-secs", "2"]).unwrap();
        match cli.command {
            Commands::Background { scenario, delay_secs } => {
                assert_eq!(scenario, BackgroundScenario::Debug);
                assert_eq!(delay_secs, 2);
            }
            _ => panic!("expected background"),
        }
    }

    #[test]
    fn parses_defaults() {
        let cli = Cli::try_parse_from(["agent-memory", "planner"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Planner { interactive: false, ref db } if db == &PathBuf::from("planner_memory.db")
        ));
        let cli = Cli::try_parse_from(["agent-memory", "plan", "build a scraper"]).unwrap();
        assert!(matches!(cli.command, Commands::Plan { ref query } if query == "build a scraper"));
    }
}
