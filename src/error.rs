//! Crate error type.
//!
//! Lookup failures surface as not-found conditions for the caller to
//! translate; degenerate scheduling states (zero workers, zero-duration
//! items, work that cannot fit) are handled by skip or truncation in
//! the services and never raise.

use thiserror::Error;

use crate::models::{AssignmentId, SessionId, WorkItemId, WorkerId};

/// Errors surfaced by the store and the scheduling services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManningError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("worker not found: {0}")]
    WorkerNotFound(WorkerId),

    #[error("work item not found: {0}")]
    WorkItemNotFound(WorkItemId),

    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    #[error("duplicate untimed assignment for work item {item} / worker {worker}")]
    DuplicateUntimedAssignment {
        item: WorkItemId,
        worker: WorkerId,
    },

    #[error("productive assignment requires a work item reference")]
    MissingWorkItem,
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, ManningError>;
