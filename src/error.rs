//! # Error Types
//!
//! Structured error handling for the queue engine. Storage failures are fatal
//! to the single call that hit them; the polling worker simply retries on its
//! next cycle, so no retry loop lives in here.

use thiserror::Error;

/// Errors surfaced by queue operations.
///
/// An empty match result and an "unavailable" queue estimate are ordinary
/// return values, not errors; only genuine faults and client mistakes
/// (unknown ids on operations that require them) appear here.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("request group {0} not found")]
    RequestGroupNotFound(i64),

    #[error("factory {0} not found")]
    FactoryNotFound(i64),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl QueueError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True for the variants a caller should report as a client error
    /// ("not found") rather than a system fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            QueueError::RequestGroupNotFound(_) | QueueError::FactoryNotFound(_)
        )
    }
}

/// Result type alias for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
