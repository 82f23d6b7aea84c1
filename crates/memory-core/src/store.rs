//! # Memory Storage
//!
//! This module defines the memory storage interface for namespaced JSON documents.
//!
//! The `MemoryStore` trait is implemented by storage backends (in-memory, SQLite).

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{Item, Namespace, SearchItem, SearchRequest};

/// Trait for storing and retrieving long-term memories.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Inserts or replaces the value stored under `(namespace, key)`.
    /// Replacing keeps the original `created_at`.
    async fn put(&self, namespace: &Namespace, key: &str, value: Value) -> Result<(), anyhow::Error>;

    /// Writes `item` with its own `created_at` and `updated_at`, replacing any existing entry.
    /// Used when restoring saved memories.
    async fn put_item(&self, item: Item) -> Result<(), anyhow::Error>;

    /// Retrieves a single item. Returns `None` if not found.
    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>, anyhow::Error>;

    /// Deletes an item. Deleting a missing key is not an error.
    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), anyhow::Error>;

    /// Searches items under a namespace prefix, by semantic similarity when the request
    /// carries a query and the store has an index, otherwise most recently updated first.
    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchItem>, anyhow::Error>;

    /// Lists distinct namespaces, optionally under `prefix` and truncated to `max_depth` labels.
    async fn list_namespaces(
        &self,
        prefix: Option<&Namespace>,
        max_depth: Option<usize>,
    ) -> Result<Vec<Namespace>, anyhow::Error>;
}
