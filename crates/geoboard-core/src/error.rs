//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::RestoreRejection;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Observer is known and sits outside the board's view radius.
    #[error("Board {board_id} is outside the view radius")]
    OutsideViewRadius { board_id: Uuid },

    /// Observer is unknown or sits outside the board's access radius.
    #[error("Board {board_id} is outside the access radius")]
    OutsideAccessRadius { board_id: Uuid },

    /// Thread is expired or archived and no longer accepts writes.
    #[error("Thread {thread_id} is closed")]
    ThreadClosed { thread_id: Uuid },

    #[error("Restore rejected: {}", .0.reason())]
    RestoreRejected(RestoreRejection),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl DomainError {
    /// Machine-readable reason string for the error.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "not-found",
            DomainError::Validation(_) => "validation-failed",
            DomainError::OutsideViewRadius { .. } => "outside-view-radius",
            DomainError::OutsideAccessRadius { .. } => "outside-access-radius",
            DomainError::ThreadClosed { .. } => "thread-closed",
            DomainError::RestoreRejected(rejection) => rejection.reason(),
            DomainError::Unauthorized => "unauthorized",
            DomainError::Repo(_) => "storage-failure",
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
