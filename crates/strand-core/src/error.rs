//! Error types for Strand Core

use thiserror::Error;

/// Result type alias using Strand's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Strand error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Graph store is not initialized")]
    NotInitialized,

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// A relationship referenced a node that does not exist
    #[error("Source or target node does not exist: {source_id} -> {target_id}")]
    MissingEndpoint {
        source_id: String,
        target_id: String,
    },

    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::limits::ValidationError> for Error {
    fn from(err: crate::limits::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
