//! Error types for cluster API operations.

use thiserror::Error;

/// Result type alias for cluster API operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur talking to the orchestrator API.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status: {0}")]
    Status(http::StatusCode),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("invalid uri: {0}")]
    Uri(String),
}
