//! Short-term memory: the message history of each thread.
//!
//! **Write flow**: the agent appends its new messages to the loaded history and puts a new
//! [`Checkpoint`] with `step + 1`. **Read flow**: `get(thread_id)` returns the latest one.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prompt::ChatMessage;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Snapshot of a thread's conversation after one agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: Uuid,
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
    pub step: u32,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(thread_id: impl Into<String>, messages: Vec<ChatMessage>, step: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            thread_id: thread_id.into(),
            messages,
            step,
            created_at: Utc::now(),
        }
    }
}

/// Stores checkpoints per thread.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Latest checkpoint of the thread.
    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>>;

    async fn put(&self, checkpoint: &Checkpoint) -> Result<()>;

    /// Thread ids with at least one checkpoint, sorted.
    async fn list_threads(&self) -> Result<Vec<String>>;
}

/// Checkpoints [`InMemorySaver`] keeps per thread by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Process-local checkpointer keeping the most recent checkpoints of every thread.
#[derive(Clone)]
pub struct InMemorySaver {
    threads: Arc<RwLock<HashMap<String, Vec<Checkpoint>>>>,
    history_limit: usize,
}

impl Default for InMemorySaver {
    fn default() -> Self {
        Self {
            threads: Arc::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl InMemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` checkpoints per thread (at least one); older ones are dropped.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Retained checkpoints of a thread, oldest first.
    pub async fn history(&self, thread_id: &str) -> Vec<Checkpoint> {
        self.threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Checkpointer for InMemorySaver {
    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self
            .threads
            .read()
            .await
            .get(thread_id)
            .and_then(|h| h.last().cloned()))
    }

    async fn put(&self, checkpoint: &Checkpoint) -> Result<()> {
        let mut threads = self.threads.write().await;
        let history = threads.entry(checkpoint.thread_id.clone()).or_default();
        history.push(checkpoint.clone());
        if history.len() > self.history_limit {
            let excess = history.len() - self.history_limit;
            history.drain(..excess);
        }
        debug!(thread_id = %checkpoint.thread_id, step = checkpoint.step, "checkpoint saved");
        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<String>> {
        let mut threads: Vec<String> = self.threads.read().await.keys().cloned().collect();
        threads.sort();
        Ok(threads)
    }
}

/// SQLite-backed checkpointer; messages are stored as JSON.
#[derive(Clone)]
pub struct SqliteSaver {
    pool: SqlitePool,
}

impl SqliteSaver {
    /// Opens (or creates) the checkpoint database; `:memory:` keeps it on one connection.
    pub async fn new(database_url: &str) -> Result<Self> {
        let in_memory = database_url == ":memory:";
        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new()
                .create_if_missing(true)
                .filename(database_url)
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                id TEXT PRIMARY KEY,
                thread_id TEXT NOT NULL,
                step INTEGER NOT NULL,
                messages TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_checkpoints_thread ON checkpoints(thread_id);
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Checkpointer for SqliteSaver {
    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let row = sqlx::query(
            "SELECT id, thread_id, step, messages, created_at FROM checkpoints \
             WHERE thread_id = ? ORDER BY rowid DESC LIMIT 1",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let id: String = row.try_get("id")?;
        let step: i64 = row.try_get("step")?;
        let messages: String = row.try_get("messages")?;
        let created_at: String = row.try_get("created_at")?;
        Ok(Some(Checkpoint {
            id: Uuid::from_str(&id)?,
            thread_id: row.try_get("thread_id")?,
            messages: serde_json::from_str(&messages)?,
            step: u32::try_from(step)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
        }))
    }

    async fn put(&self, checkpoint: &Checkpoint) -> Result<()> {
        sqlx::query(
            "INSERT INTO checkpoints (id, thread_id, step, messages, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(checkpoint.id.to_string())
        .bind(&checkpoint.thread_id)
        .bind(i64::from(checkpoint.step))
        .bind(serde_json::to_string(&checkpoint.messages)?)
        .bind(checkpoint.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        debug!(thread_id = %checkpoint.thread_id, step = checkpoint.step, "checkpoint saved to SQLite");
        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT thread_id FROM checkpoints ORDER BY thread_id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| r.try_get::<String, _>("thread_id").map_err(Into::into))
            .collect()
    }
}
