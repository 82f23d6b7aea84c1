//! Integration tests for the `memories` subcommand.
//!
//! **BDD style**: Given a SQLite store on disk, when the listing runs, then it reads every
//! namespace or only the one asked for.

use agent_memory_cli::commands::memories;
use anyhow::Result;
use memory_core::{MemoryStore, Namespace};
use memory_sqlite::SqliteStore;
use serde_json::json;
use tempfile::TempDir;

/// **Test: listing all namespaces and a single dotted namespace both succeed.**
#[tokio::test]
async fn lists_namespaces_from_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let db = dir.path().join("planner_memory.db");
    let path = db.to_str().expect("utf-8 path");
    {
        let store = SqliteStore::new(path).await?;
        let episodes = Namespace::new(["planner_episodes"])?;
        store
            .put(&episodes, "e1", json!({"content": "plan approved"}))
            .await?;
        store
            .put(&Namespace::new(["memories", "alice"])?, "m1", json!({"content": "dark mode"}))
            .await?;
        assert_eq!(store.list_namespaces(None, None).await?.len(), 2);
    }

    memories::run(&db, None).await?;
    memories::run(&db, Some("memories.alice")).await?;
    Ok(())
}

/// **Test: a malformed namespace argument is an error.**
#[tokio::test]
async fn rejects_empty_namespace() -> Result<()> {
    let dir = TempDir::new()?;
    let db = dir.path().join("empty.db");
    assert!(memories::run(&db, Some("")).await.is_err());
    Ok(())
}
