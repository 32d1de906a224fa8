//! Error taxonomy for the timer core, the store and the runtime context

use thiserror::Error;

use crate::storage::StorageError;

/// Rejected mutations. No state changes when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("You must have at least one tab.")]
    LastGroup,

    #[error("Group {0} not found")]
    GroupNotFound(u64),

    #[error("Timer {0} not found in the active group")]
    TimerNotFound(u64),

    #[error("Timer {0} is being edited and cannot be started")]
    TimerEditing(u64),

    #[error("{0} requires explicit confirmation")]
    ConfirmationRequired(&'static str),
}

/// Errors surfaced by the shared runtime context.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Failed to persist state: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to lock timer board: {0}")]
    Poisoned(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Result type for runtime context operations.
pub type AppResult<T> = Result<T, AppError>;
