//! Memory error types.
//!
//! Store implementations return `anyhow::Error`; these variants are what callers
//! can downcast to when they need to tell failures apart.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Unresolved namespace placeholder: {0}")]
    UnresolvedPlaceholder(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
