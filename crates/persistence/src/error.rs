//! Persistence error types

use thiserror::Error;

/// Errors from the persistence layer
///
/// Query and session failures are transient from the caller's perspective:
/// the orchestrator retries them up to its configured budget before
/// surfacing the turn as failed.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("ScyllaDB connection failed: {0}")]
    Connection(#[from] scylla::transport::errors::NewSessionError),

    #[error("ScyllaDB query failed: {0}")]
    Query(#[from] scylla::transport::errors::QueryError),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("invalid stored data: {0}")]
    InvalidData(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl PersistenceError {
    /// Whether retrying the operation can plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Query(_))
    }
}
