//! # In-Memory Store
//!
//! This crate provides an in-memory implementation of the `MemoryStore` trait from `memory-core`.
//!
//! ## InMemoryStore
//!
//! Namespaced JSON documents kept in a map, with an optional embedding index for
//! semantic search.
//!
//! **Advantages**:
//! - Fastest performance (no I/O)
//! - Simple to set up and use
//!
//! **Limitations**:
//! - Data is lost on restart (see `memory-persistence` for JSON snapshots)
//! - Semantic search is a linear scan
//!
//! ## Example
//!
//! ```rust
//! use memory_inmemory::InMemoryStore;
//! use memory_core::{MemoryStore, Namespace};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), anyhow::Error> {
//!     let store = InMemoryStore::new();
//!     let ns = Namespace::new(["memories"])?;
//!     store.put(&ns, "pref-1", json!({"content": "prefers dark mode"})).await?;
//!     assert!(store.get(&ns, "pref-1").await?.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Thread Safety
//!
//! The store uses `Arc<RwLock<>>`; clones share the same data.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use embedding::EmbeddingService;
use memory_core::{
    index_text, rank_items, IndexConfig, Item, MemoryError, MemoryStore, Namespace, SearchItem,
    SearchRequest,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct StoredItem {
    item: Item,
    embedding: Option<Vec<f32>>,
}

type Key = (Namespace, String);

#[derive(Clone)]
struct Index {
    config: IndexConfig,
    embedding: Arc<dyn EmbeddingService>,
}

/// In-memory memory store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<BTreeMap<Key, StoredItem>>>,
    index: Option<Index>,
}

impl InMemoryStore {
    /// Creates a new empty store without an embedding index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty store that embeds values on `put` and queries on `search`.
    pub fn with_index(config: IndexConfig, embedding: Arc<dyn EmbeddingService>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            index: Some(Index { config, embedding }),
        }
    }

    /// Returns true when an embedding index is configured.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Returns the number of items in the store.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Clears all items from the store.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn embed_value(&self, value: &Value) -> Result<Option<Vec<f32>>, anyhow::Error> {
        let Some(index) = &self.index else {
            return Ok(None);
        };
        let Some(text) = index_text(value, &index.config.fields) else {
            debug!("no indexable text in value, storing without embedding");
            return Ok(None);
        };
        let vector = index.embedding.embed(&text).await?;
        index.config.check_dims(&vector)?;
        Ok(Some(vector))
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn put(&self, namespace: &Namespace, key: &str, value: Value) -> Result<(), anyhow::Error> {
        if !value.is_object() {
            return Err(MemoryError::InvalidValue(format!(
                "value for key {:?} must be a JSON object",
                key
            ))
            .into());
        }
        // Embed before taking the lock so slow embedding calls do not block readers.
        let embedding = self.embed_value(&value).await?;

        info!(
            namespace = %namespace,
            key = %key,
            has_embedding = embedding.is_some(),
            "Writing item to in-memory store"
        );

        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let map_key = (namespace.clone(), key.to_string());
        let created_at = entries
            .get(&map_key)
            .map(|e| e.item.created_at)
            .unwrap_or(now);
        entries.insert(
            map_key,
            StoredItem {
                item: Item {
                    namespace: namespace.clone(),
                    key: key.to_string(),
                    value,
                    created_at,
                    updated_at: now,
                },
                embedding,
            },
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
        debug!(namespace = %item.namespace, key = %item.key, "Restoring item into in-memory store");
        self.entries.write().await.insert(
            (item.namespace.clone(), item.key.clone()),
            StoredItem { item, embedding },
        );
        Ok(())
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>, anyhow::Error> {
        let entries = self.entries.read().await;
        let result = entries
            .get(&(namespace.clone(), key.to_string()))
            .map(|e| e.item.clone());
        debug!(namespace = %namespace, key = %key, found = result.is_some(), "In-memory store get");
        Ok(result)
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), anyhow::Error> {
        let removed = self
            .entries
            .write()
            .await
            .remove(&(namespace.clone(), key.to_string()));
        info!(namespace = %namespace, key = %key, removed = removed.is_some(), "In-memory store delete");
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

        let candidates: Vec<(Item, Option<Vec<f32>>)> = {
            let entries = self.entries.read().await;
            entries
                .values()
                .filter(|e| e.item.namespace.starts_with(&request.namespace_prefix))
                .map(|e| (e.item.clone(), e.embedding.clone()))
                .collect()
        };

        let results = rank_items(candidates, &request, query_embedding.as_deref());
        info!(
            prefix = %request.namespace_prefix,
            semantic = query_embedding.is_some(),
            count = results.len(),
            "In-memory store search returned"
        );
        Ok(results)
    }

    async fn list_namespaces(
        &self,
        prefix: Option<&Namespace>,
        max_depth: Option<usize>,
    ) -> Result<Vec<Namespace>, anyhow::Error> {
        let entries = self.entries.read().await;
        let namespaces: BTreeSet<Namespace> = entries
            .keys()
            .map(|(ns, _)| ns)
            .filter(|ns| prefix.map_or(true, |p| ns.starts_with(p)))
            .map(|ns| match max_depth {
                Some(depth) => ns.truncated(depth),
                None => ns.clone(),
            })
            .collect();
        Ok(namespaces.into_iter().collect())
    }
}
