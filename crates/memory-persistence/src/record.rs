use chrono::{DateTime, Utc};
use memory_core::{Item, MemoryError, Namespace};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One memory as written to a snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMemory {
    pub key: String,
    pub value: Value,
    pub namespace: Vec<String>,
    /// First namespace label; used for per-agent breakdowns.
    pub namespace_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub saved_timestamp: DateTime<Utc>,
}

impl SavedMemory {
    pub fn from_item(item: Item, saved_under: &Namespace, saved_at: DateTime<Utc>) -> Self {
        Self {
            namespace: item.namespace.labels().to_vec(),
            namespace_name: saved_under
                .labels()
                .first()
                .cloned()
                .unwrap_or_default(),
            key: item.key,
            value: item.value,
            created_at: item.created_at,
            updated_at: item.updated_at,
            saved_timestamp: saved_at,
        }
    }

    /// The stored item, timestamps included.
    pub fn to_item(&self) -> Result<Item, MemoryError> {
        Ok(Item {
            namespace: self.namespace()?,
            key: self.key.clone(),
            value: self.value.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    /// The validated namespace of the record.
    pub fn namespace(&self) -> Result<Namespace, MemoryError> {
        Namespace::new(self.namespace.iter().cloned())
    }
}
