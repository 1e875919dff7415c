//! Error types for dql

use thiserror::Error;

/// Result type alias for dql operations
pub type DqlResult<T> = Result<T, DqlError>;

/// Error types for building and executing DQL queries
#[derive(Debug, Error)]
pub enum DqlError {
    /// A clause key that does not name any [`ClauseKind`](crate::ClauseKind)
    #[error("Invalid clause kind: {0}")]
    InvalidClauseKind(String),

    /// Query execution error reported by an [`Executor`](crate::Executor)
    #[error("Execution error: {0}")]
    Execution(String),
}

impl DqlError {
    /// Create an invalid clause kind error
    pub fn invalid_clause_kind(key: impl Into<String>) -> Self {
        Self::InvalidClauseKind(key.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is an invalid clause kind error
    pub fn is_invalid_clause_kind(&self) -> bool {
        matches!(self, Self::InvalidClauseKind(_))
    }

    /// Check if this is an execution error
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}
