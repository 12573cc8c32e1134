use thiserror::Error;

use crate::models::TaskId;

/// Everything a board operation can refuse to do. None of these are fatal:
/// the board is left in its last valid state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Task name cannot be empty")]
    EmptyName,

    #[error("Task {0} not found")]
    UnknownTask(TaskId),

    #[error("Task {0} must be in Today to start")]
    NotScheduledToday(TaskId),

    #[error("Invalid start time '{0}'. Use format like \"11:55 PM\"")]
    InvalidStartTime(String),

    #[error("Invalid end time '{0}'. Use format like \"12:30 PM\"")]
    InvalidEndTime(String),

    #[error("Start time must be before or equal to end time")]
    StartAfterEnd,
}

impl Error {
    /// Stable reason code for edit validation failures.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::EmptyName => "empty-name",
            Error::UnknownTask(_) => "unknown-task",
            Error::NotScheduledToday(_) => "not-scheduled-today",
            Error::InvalidStartTime(_) => "invalid-start-time",
            Error::InvalidEndTime(_) => "invalid-end-time",
            Error::StartAfterEnd => "start-after-end",
        }
    }

    /// True for the errors an edit surfaces to the user.
    pub fn is_edit_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidStartTime(_) | Error::InvalidEndTime(_) | Error::StartAfterEnd
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
