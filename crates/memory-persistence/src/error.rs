use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] memory_core::MemoryError),

    #[error("Store error: {0}")]
    Store(anyhow::Error),
}
