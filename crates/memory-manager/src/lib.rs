//! # Memory manager
//!
//! Background ("subconscious") memory formation.
//!
//! - [`MemoryStoreManager`]: reads a conversation, asks the LLM which memories to create,
//!   update or delete in a namespace, and applies the changes to a [`memory_core::MemoryStore`].
//! - [`ReflectionExecutor`]: runs the manager after a delay; a newer submission for the same
//!   thread replaces the pending one, so only the latest conversation is processed.

mod error;
mod executor;
mod manager;
mod parse;

pub use error::ManagerError;
pub use executor::{ReflectionExecutor, ReflectionRequest};
pub use manager::{MemoryChange, MemoryStoreManager, DEFAULT_INSTRUCTIONS, DEFAULT_QUERY_LIMIT};
pub use parse::{parse_extraction, Extraction, MemoryOp};
