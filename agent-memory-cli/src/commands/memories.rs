//! Lists what a SQLite memory database holds.

use std::path::Path;

use anyhow::{Context, Result};
use memory_core::{MemoryStore, Namespace};
use memory_sqlite::SqliteStore;

use crate::display::{banner, print_memories};

const LIST_LIMIT: usize = 1000;

pub async fn run(db: &Path, namespace: Option<&str>) -> Result<()> {
    let path = db
        .to_str()
        .with_context(|| format!("database path is not UTF-8: {}", db.display()))?;
    let store = SqliteStore::new(path).await?;
    banner(&format!("Memories in {}", db.display()));

    let namespaces = match namespace {
        Some(dotted) => vec![Namespace::from_dotted(dotted)?],
        None => store.list_namespaces(None, None).await?,
    };
    if namespaces.is_empty() {
        println!("No namespaces found");
        return Ok(());
    }
    for ns in &namespaces {
        print_memories(&store, ns, &ns.dotted(), LIST_LIMIT).await?;
    }
    Ok(())
}
