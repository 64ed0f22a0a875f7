use thiserror::Error;

/// Failures raised by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Employee not found: {0}")]
    NotFound(String),
    #[error("Version conflict on {id}: expected {expected}, found {found}")]
    Conflict { id: String, expected: u64, found: u64 },
}
