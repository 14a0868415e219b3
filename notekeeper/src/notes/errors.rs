//! Note error types.

use crate::db::timeouts::TimeoutError;
use std::time::Duration;
use thiserror::Error;

/// Note errors
#[derive(Debug, Error)]
pub enum NoteError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Empty or whitespace-only title
    #[error("Title is required")]
    TitleRequired,

    /// Path segment is not a note ID
    #[error("Invalid note ID")]
    InvalidNoteId,

    /// Absent, or owned by someone else
    #[error("Note not found or unauthorized")]
    NotFound,
}

impl NoteError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            NoteError::Database(_) | NoteError::Timeout(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<TimeoutError> for NoteError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => NoteError::Timeout(duration),
            TimeoutError::Database(e) => NoteError::Database(e),
        }
    }
}

/// Result type for note operations
pub type NoteResult<T> = Result<T, NoteError>;
