use memory_core::MemoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Could not parse memory extraction: {0}")]
    Parse(String),

    #[error("Namespace error: {0}")]
    Namespace(#[from] MemoryError),
}
