//! Flat SQLite export of snapshot records.

use std::path::Path;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::{PersistenceError, SavedMemory};

/// Appends `records` to the `memories` table of the database at `db_path`.
///
/// `content` and `namespace` hold the JSON encoding of the value and namespace labels.
/// Returns the number of rows inserted.
pub async fn export_sqlite(
    records: &[SavedMemory],
    db_path: impl AsRef<Path>,
) -> Result<usize, PersistenceError> {
    let db_path = db_path.as_ref();
    let options = SqliteConnectOptions::new()
        .create_if_missing(true)
        .filename(db_path);
    let pool = SqlitePool::connect_with(options).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS memories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT,
            content TEXT,
            namespace TEXT,
            created_at TEXT,
            updated_at TEXT,
            saved_timestamp TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    let mut tx = pool.begin().await?;
    for record in records {
        sqlx::query(
            r#"
            INSERT INTO memories (key, content, namespace, created_at, updated_at, saved_timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.key)
        .bind(serde_json::to_string(&record.value)?)
        .bind(serde_json::to_string(&record.namespace)?)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .bind(record.saved_timestamp.to_rfc3339())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    pool.close().await;

    info!(count = records.len(), db = %db_path.display(), "Exported memories to SQLite");
    Ok(records.len())
}
