//! # Memory Snapshots
//!
//! Saves the contents of selected namespaces of a [`MemoryStore`] to a JSON file, keeps a
//! timestamped backup of every save, restores snapshots into a store and exports them to
//! a flat SQLite table.
//!
//! ## Layout
//!
//! ```text
//! <dir>/memories.json
//! <dir>/backups/memories_backup_20250101_120000.json
//! <dir>/memories.sqlite            (export_sqlite default)
//! ```

mod error;
mod export;
mod record;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use memory_core::{MemoryStore, Namespace, SearchRequest};
use tracing::{info, warn};

pub use error::PersistenceError;
pub use export::export_sqlite;
pub use record::SavedMemory;

/// File name of the current snapshot.
pub const SNAPSHOT_FILE: &str = "memories.json";

/// Default file name for [`SnapshotStore::default_export_path`].
pub const EXPORT_DB_FILE: &str = "memories.sqlite";

const PAGE_SIZE: usize = 100;

/// Outcome of [`SnapshotStore::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub total: usize,
    /// Record count per namespace, keyed by dotted name.
    pub per_namespace: BTreeMap<String, usize>,
    pub snapshot_path: PathBuf,
    pub backup_path: PathBuf,
}

/// Snapshot directory with a `backups/` subdirectory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    backup_dir: PathBuf,
}

impl SnapshotStore {
    /// Opens `dir`, creating it and `dir/backups` when missing.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        let backup_dir = dir.join("backups");
        tokio::fs::create_dir_all(&backup_dir).await?;
        Ok(Self { dir, backup_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn default_export_path(&self) -> PathBuf {
        self.dir.join(EXPORT_DB_FILE)
    }

    /// Collects every item under each namespace and writes the snapshot plus a backup.
    ///
    /// A namespace that fails to read is logged and skipped; the others are still saved.
    pub async fn save(
        &self,
        store: &dyn MemoryStore,
        namespaces: &[Namespace],
    ) -> Result<SaveReport, PersistenceError> {
        let saved_at = Utc::now();
        let mut records = Vec::new();
        let mut per_namespace = BTreeMap::new();

        for namespace in namespaces {
            match collect_namespace(store, namespace).await {
                Ok(items) => {
                    info!(namespace = %namespace, count = items.len(), "Collected memories for snapshot");
                    per_namespace.insert(namespace.dotted(), items.len());
                    records.extend(
                        items
                            .into_iter()
                            .map(|item| SavedMemory::from_item(item, namespace, saved_at)),
                    );
                }
                Err(e) => warn!(namespace = %namespace, error = %e, "Skipping namespace in snapshot"),
            }
        }

        let json = serde_json::to_string_pretty(&records)?;
        let snapshot_path = self.snapshot_path();
        tokio::fs::write(&snapshot_path, &json).await?;

        let backup_path = self.backup_dir.join(format!(
            "memories_backup_{}.json",
            saved_at.format("%Y%m%d_%H%M%S")
        ));
        tokio::fs::write(&backup_path, &json).await?;

        info!(
            total = records.len(),
            snapshot = %snapshot_path.display(),
            backup = %backup_path.display(),
            "Saved memory snapshot"
        );

        Ok(SaveReport {
            total: records.len(),
            per_namespace,
            snapshot_path,
            backup_path,
        })
    }

    /// Reads the current snapshot. A missing file yields an empty list.
    pub async fn load(&self) -> Result<Vec<SavedMemory>, PersistenceError> {
        let path = self.snapshot_path();
        if !tokio::fs::try_exists(&path).await? {
            info!(path = %path.display(), "No existing memory snapshot");
            return Ok(Vec::new());
        }
        let raw = tokio::fs::read_to_string(&path).await?;
        let records: Vec<SavedMemory> = serde_json::from_str(&raw)?;
        info!(count = records.len(), path = %path.display(), "Loaded memory snapshot");
        Ok(records)
    }

    /// Lists backup files, oldest first.
    pub async fn backups(&self) -> Result<Vec<PathBuf>, PersistenceError> {
        let mut entries = tokio::fs::read_dir(&self.backup_dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |e| e == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// Writes snapshot records back into `store` with their original timestamps.
/// Returns how many were written.
pub async fn restore(
    store: &dyn MemoryStore,
    records: &[SavedMemory],
) -> Result<usize, PersistenceError> {
    let mut restored = 0;
    for record in records {
        store
            .put_item(record.to_item()?)
            .await
            .map_err(PersistenceError::Store)?;
        restored += 1;
    }
    info!(restored, "Restored memories from snapshot");
    Ok(restored)
}

async fn collect_namespace(
    store: &dyn MemoryStore,
    namespace: &Namespace,
) -> Result<Vec<memory_core::Item>, anyhow::Error> {
    let mut items = Vec::new();
    let mut offset = 0;
    loop {
        let page = store
            .search(
                SearchRequest::new(namespace.clone())
                    .with_limit(PAGE_SIZE)
                    .with_offset(offset),
            )
            .await?;
        let n = page.len();
        items.extend(page.into_iter().map(|hit| hit.item));
        if n < PAGE_SIZE {
            break;
        }
        offset += n;
    }
    Ok(items)
}
