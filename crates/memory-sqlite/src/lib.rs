//! # SQLite Store
//!
//! This module provides an SQLite-based implementation of the `MemoryStore` trait.
//!
//! ## SqliteStore
//!
//! Persistent storage for namespaced memories and their embeddings.
//!
//! **Advantages**:
//! - Persistent storage (data survives restarts)
//! - No external database required
//!
//! **Limitations**:
//! - Semantic search loads every candidate vector under the prefix and ranks in process
//! - Single-file database
//!
//! ## Example
//!
//! ```rust,no_run
//! use memory_sqlite::SqliteStore;
//! use memory_core::{MemoryStore, Namespace};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), anyhow::Error> {
//!     let store = SqliteStore::new("memories.db").await?;
//!     let ns = Namespace::new(["memories", "user-1"])?;
//!     store.put(&ns, "pref", json!({"content": "likes tea"})).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE store_items (
//!     prefix TEXT NOT NULL,
//!     key TEXT NOT NULL,
//!     value TEXT NOT NULL,
//!     embedding BLOB,
//!     created_at TEXT NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     PRIMARY KEY (prefix, key)
//! );
//! ```
//!
//! `prefix` is the dotted namespace; embeddings are little-endian `f32` BLOBs.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use embedding::EmbeddingService;
use memory_core::{
    index_text, rank_items, IndexConfig, Item, MemoryError, MemoryStore, Namespace, SearchItem,
    SearchRequest,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

#[derive(Clone)]
struct Index {
    config: IndexConfig,
    embedding: Arc<dyn EmbeddingService>,
}

/// SQLite-backed memory store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    index: Option<Index>,
}

impl SqliteStore {
    /// Opens (or creates) the store at `database_url`.
    ///
    /// Accepts a file path (`memories.db`), a `sqlite:` URL, or `:memory:`. An in-memory
    /// database is held on a single connection so every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection or schema initialization fails.
    pub async fn new(database_url: &str) -> Result<Self, anyhow::Error> {
        let in_memory = database_url == ":memory:" || database_url == "sqlite::memory:";
        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else if database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database_url)?.create_if_missing(true)
        } else {
            SqliteConnectOptions::new()
                .create_if_missing(true)
                .filename(database_url)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        let store = Self { pool, index: None };
        store.init_schema().await?;
        info!(database_url = %database_url, "SQLite store opened");
        Ok(store)
    }

    /// Adds an embedding index: values are embedded on `put`, queries on `search`.
    pub fn with_index(mut self, config: IndexConfig, embedding: Arc<dyn EmbeddingService>) -> Self {
        self.index = Some(Index { config, embedding });
        self
    }

    async fn init_schema(&self) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS store_items (
                prefix TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                embedding BLOB,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (prefix, key)
            );

            CREATE INDEX IF NOT EXISTS idx_store_items_updated_at ON store_items(updated_at);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn embed_value(&self, value: &Value) -> Result<Option<Vec<f32>>, anyhow::Error> {
        let Some(index) = &self.index else {
            return Ok(None);
        };
        let Some(text) = index_text(value, &index.config.fields) else {
            return Ok(None);
        };
        let vector = index.embedding.embed(&text).await?;
        index.config.check_dims(&vector)?;
        Ok(Some(vector))
    }

    fn row_to_item(row: &SqliteRow) -> Result<(Item, Option<Vec<f32>>), anyhow::Error> {
        let prefix: String = row.try_get("prefix")?;
        let key: String = row.try_get("key")?;
        let value_str: String = row.try_get("value")?;
        let embedding_blob: Option<Vec<u8>> = row.try_get("embedding")?;
        let created_at_str: String = row.try_get("created_at")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        let item = Item {
            namespace: Namespace::from_dotted(&prefix)?,
            key,
            value: serde_json::from_str(&value_str)?,
            created_at: parse_timestamp(&created_at_str)?,
            updated_at: parse_timestamp(&updated_at_str)?,
        };
        let embedding = embedding_blob.map(|b| blob_to_vector(&b)).transpose()?;
        Ok((item, embedding))
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, anyhow::Error> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn vector_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_vector(blob: &[u8]) -> Result<Vec<f32>, anyhow::Error> {
    if blob.len() % 4 != 0 {
        anyhow::bail!("Invalid embedding data length: {}", blob.len());
    }
    Ok(blob
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Escapes LIKE wildcards; used with `ESCAPE '\'`.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn put(&self, namespace: &Namespace, key: &str, value: Value) -> Result<(), anyhow::Error> {
        if !value.is_object() {
            return Err(MemoryError::InvalidValue(format!(
                "value for key {:?} must be a JSON object",
                key
            ))
            .into());
        }
        let embedding = self.embed_value(&value).await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO store_items (prefix, key, value, embedding, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(prefix, key) DO UPDATE SET
                value = excluded.value,
                embedding = excluded.embedding,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(namespace.dotted())
        .bind(key)
        .bind(serde_json::to_string(&value)?)
        .bind(embedding.as_deref().map(vector_to_blob))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(
            namespace = %namespace,
            key = %key,
            has_embedding = embedding.is_some(),
            "Wrote item to SQLite store"
        );
        Ok(())
    }

    async fn put_item(&self, item: Item) -> Result<(), anyhow::Error> {
        if !item.value.is_object() {
            return Err(MemoryError::InvalidValue(format!(
                "value for key {:?} must be a JSON object",
                item.key
            ))
            .into());
        }
        let embedding = self.embed_value(&item.value).await?;

        sqlx::query(
            r#"
            INSERT INTO store_items (prefix, key, value, embedding, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(prefix, key) DO UPDATE SET
                value = excluded.value,
                embedding = excluded.embedding,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(item.namespace.dotted())
        .bind(&item.key)
        .bind(serde_json::to_string(&item.value)?)
        .bind(embedding.as_deref().map(vector_to_blob))
        .bind(item.created_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(namespace = %item.namespace, key = %item.key, "Restored item into SQLite store");
        Ok(())
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>, anyhow::Error> {
        let row = sqlx::query("SELECT * FROM store_items WHERE prefix = ? AND key = ?")
            .bind(namespace.dotted())
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_item(&row)?.0)),
            None => Ok(None),
        }
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), anyhow::Error> {
        let result = sqlx::query("DELETE FROM store_items WHERE prefix = ? AND key = ?")
            .bind(namespace.dotted())
            .bind(key)
            .execute(&self.pool)
            .await?;
        info!(
            namespace = %namespace,
            key = %key,
            removed = result.rows_affected(),
            "SQLite store delete"
        );
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchItem>, anyhow::Error> {
        let query_embedding = match (&self.index, request.query.as_deref()) {
            (Some(index), Some(query)) => match index.embedding.embed(query).await {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(error = %e, "query embedding failed, falling back to recency order");
                    None
                }
            },
            _ => None,
        };

        let prefix = request.namespace_prefix.dotted();
        let rows = sqlx::query(
            r#"
            SELECT * FROM store_items
            WHERE prefix = ? OR prefix LIKE ? ESCAPE '\'
            "#,
        )
        .bind(&prefix)
        .bind(format!("{}.%", escape_like(&prefix)))
        .fetch_all(&self.pool)
        .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            match Self::row_to_item(row) {
                Ok(c) => candidates.push(c),
                Err(e) => warn!(error = %e, "skipping unreadable store row"),
            }
        }
        debug!(candidates = candidates.len(), "SQLite store search candidates loaded");

        let results = rank_items(candidates, &request, query_embedding.as_deref());
        info!(
            prefix = %prefix,
            semantic = query_embedding.is_some(),
            count = results.len(),
            "SQLite store search returned"
        );
        Ok(results)
    }

    async fn list_namespaces(
        &self,
        prefix: Option<&Namespace>,
        max_depth: Option<usize>,
    ) -> Result<Vec<Namespace>, anyhow::Error> {
        let rows = sqlx::query("SELECT DISTINCT prefix FROM store_items")
            .fetch_all(&self.pool)
            .await?;

        let mut namespaces = BTreeSet::new();
        for row in rows {
            let dotted: String = row.try_get("prefix")?;
            let ns = Namespace::from_dotted(&dotted)?;
            if prefix.map_or(true, |p| ns.starts_with(p)) {
                namespaces.insert(match max_depth {
                    Some(depth) => ns.truncated(depth),
                    None => ns,
                });
            }
        }
        Ok(namespaces.into_iter().collect())
    }
}
