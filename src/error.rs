//! Error types for dfql.

use crate::types::DataType;
use thiserror::Error;

/// The main error type for dfql operations.
#[derive(Debug, Error)]
pub enum DfqlError {
    /// No SQL idiom exists for the requested operator or flag combination.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// Cast not permitted by the type lattice.
    #[error("Cannot cast from {from} to {to}")]
    IllegalCast { from: DataType, to: DataType },

    /// The DAG or the compiler state contradicts itself.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// Duplicate, missing or unnamed field.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DfqlError {
    /// Create an unsupported-construct error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Create an internal-inconsistency error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InternalInconsistency(message.into())
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create an illegal-cast error.
    pub fn cast(from: DataType, to: DataType) -> Self {
        Self::IllegalCast { from, to }
    }
}

/// Result type alias for dfql operations.
pub type DfqlResult<T> = Result<T, DfqlError>;
