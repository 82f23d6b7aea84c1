//! Snapshot save / load / restore / export tests against an in-memory store.

use chrono::{TimeZone, Utc};
use memory_core::{MemoryStore, Namespace};
use memory_inmemory::InMemoryStore;
use memory_persistence::{export_sqlite, restore, SnapshotStore};
use serde_json::json;
use sqlx::Row;
use tempfile::TempDir;

fn ns(label: &str) -> Namespace {
    Namespace::new([label]).unwrap()
}

async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .put(&ns("math_memories"), "m1", json!({"content": "user likes step-by-step math"}))
        .await
        .unwrap();
    store
        .put(&ns("math_memories"), "m2", json!({"content": "prefers metric units"}))
        .await
        .unwrap();
    store
        .put(&ns("writing_memories"), "w1", json!({"content": "formal tone"}))
        .await
        .unwrap();
    store
}

/// **Test: Save writes snapshot and a backup, with per-namespace counts.**
#[tokio::test]
async fn save_writes_snapshot_and_backup() {
    let dir = TempDir::new().unwrap();
    let snapshots = SnapshotStore::new(dir.path().join("memory_storage")).await.unwrap();
    let store = seeded_store().await;

    let report = snapshots
        .save(
            &store,
            &[ns("math_memories"), ns("research_memories"), ns("writing_memories")],
        )
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.per_namespace["math_memories"], 2);
    assert_eq!(report.per_namespace["research_memories"], 0);
    assert_eq!(report.per_namespace["writing_memories"], 1);
    assert!(report.snapshot_path.exists());
    assert!(report.backup_path.exists());

    let name = report.backup_path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("memories_backup_"));
    assert!(name.ends_with(".json"));
    assert_eq!(snapshots.backups().await.unwrap().len(), 1);
}

/// **Test: Load of a missing snapshot is empty.**
#[tokio::test]
async fn load_missing_is_empty() {
    let dir = TempDir::new().unwrap();
    let snapshots = SnapshotStore::new(dir.path()).await.unwrap();
    assert!(snapshots.load().await.unwrap().is_empty());
    assert!(snapshots.backup_dir().is_dir());
}

/// **Test: Saved records load back and restore into a fresh store.**
#[tokio::test]
async fn load_and_restore() {
    let dir = TempDir::new().unwrap();
    let snapshots = SnapshotStore::new(dir.path()).await.unwrap();
    snapshots
        .save(&seeded_store().await, &[ns("math_memories"), ns("writing_memories")])
        .await
        .unwrap();

    let records = snapshots.load().await.unwrap();
    assert_eq!(records.len(), 3);
    let w1 = records.iter().find(|r| r.key == "w1").unwrap();
    assert_eq!(w1.namespace, vec!["writing_memories".to_string()]);
    assert_eq!(w1.namespace_name, "writing_memories");

    let fresh = InMemoryStore::new();
    assert_eq!(restore(&fresh, &records).await.unwrap(), 3);
    let item = fresh.get(&ns("writing_memories"), "w1").await.unwrap().unwrap();
    assert_eq!(item.value["content"], "formal tone");
}

/// **Test: Restore keeps the saved timestamps, so a second save writes the originals.**
#[tokio::test]
async fn restore_keeps_original_timestamps() {
    let dir = TempDir::new().unwrap();
    let snapshots = SnapshotStore::new(dir.path()).await.unwrap();
    let mut records = {
        let store = seeded_store().await;
        snapshots.save(&store, &[ns("writing_memories")]).await.unwrap();
        snapshots.load().await.unwrap()
    };
    let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let updated = Utc.with_ymd_and_hms(2024, 6, 7, 8, 9, 10).unwrap();
    records[0].created_at = created;
    records[0].updated_at = updated;

    let fresh = InMemoryStore::new();
    restore(&fresh, &records).await.unwrap();
    let item = fresh.get(&ns("writing_memories"), "w1").await.unwrap().unwrap();
    assert_eq!(item.created_at, created);
    assert_eq!(item.updated_at, updated);

    snapshots.save(&fresh, &[ns("writing_memories")]).await.unwrap();
    let resaved = snapshots.load().await.unwrap();
    assert_eq!(resaved[0].created_at, created);
    assert_eq!(resaved[0].updated_at, updated);
}

/// **Test: Export writes one row per record with JSON-encoded columns.**
#[tokio::test]
async fn export_to_sqlite() {
    let dir = TempDir::new().unwrap();
    let snapshots = SnapshotStore::new(dir.path()).await.unwrap();
    snapshots
        .save(&seeded_store().await, &[ns("writing_memories")])
        .await
        .unwrap();
    let records = snapshots.load().await.unwrap();

    let db_path = snapshots.default_export_path();
    assert_eq!(export_sqlite(&records, &db_path).await.unwrap(), 1);

    let pool = sqlx::SqlitePool::connect(&format!("sqlite://{}", db_path.display()))
        .await
        .unwrap();
    let row = sqlx::query("SELECT key, content, namespace FROM memories")
        .fetch_one(&pool)
        .await
        .unwrap();
    let key: String = row.get("key");
    let content: String = row.get("content");
    let namespace: String = row.get("namespace");
    assert_eq!(key, "w1");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&content).unwrap(),
        json!({"content": "formal tone"})
    );
    assert_eq!(namespace, r#"["writing_memories"]"#);
}
