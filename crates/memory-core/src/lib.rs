//! # Memory Core
//!
//! Core types and traits for long-term agent memory.
//! Used by the store backends (`memory-inmemory`, `memory-sqlite`), the agent memory
//! tools and the background memory manager.
//!
//! ## Modules
//!
//! - [`types`] - Namespace, NamespaceTemplate, Item, SearchItem, SearchRequest
//! - [`store`] - MemoryStore trait
//! - [`index`] - IndexConfig, index text extraction, cosine ranking
//! - [`error`] - MemoryError

pub mod error;
pub mod index;
pub mod store;
pub mod types;

pub use error::MemoryError;
pub use index::{cosine_similarity, index_text, matches_filter, rank_items, IndexConfig};
pub use store::MemoryStore;
pub use types::*;
