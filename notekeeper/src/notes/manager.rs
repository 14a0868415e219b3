//! Note manager implementation.

use super::{
    errors::{NoteError, NoteResult},
    models::{CreateNoteRequest, NewNote, Note, NoteId},
};
use crate::{auth::UserId, db::NoteRepository};
use std::sync::Arc;

/// Note manager
#[derive(Clone)]
pub struct NoteManager {
    notes: Arc<dyn NoteRepository>,
}

impl NoteManager {
    /// Create a new note manager
    pub fn new(notes: Arc<dyn NoteRepository>) -> Self {
        Self { notes }
    }

    /// Create a note owned by `user_id`
    ///
    /// The stored title is trimmed.
    ///
    /// # Errors
    ///
    /// * `NoteError::TitleRequired` - Title is empty after trimming
    pub async fn create(&self, user_id: UserId, request: CreateNoteRequest) -> NoteResult<Note> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(NoteError::TitleRequired);
        }

        let note = self
            .notes
            .create_note(&NewNote {
                title: title.to_string(),
                user_id,
            })
            .await?;

        log::info!("User {} created note {}", user_id, note.id);
        Ok(note)
    }

    /// All notes owned by `user_id`, newest first
    pub async fn list(&self, user_id: UserId) -> NoteResult<Vec<Note>> {
        self.notes.list_by_owner(user_id).await
    }

    /// Delete a note by its raw path identifier
    ///
    /// # Errors
    ///
    /// * `NoteError::InvalidNoteId` - `raw_id` is not a note ID
    /// * `NoteError::NotFound` - No such note owned by `user_id`
    pub async fn delete(&self, user_id: UserId, raw_id: &str) -> NoteResult<()> {
        let note_id = parse_note_id(raw_id)?;

        if !self.notes.delete_owned(note_id, user_id).await? {
            return Err(NoteError::NotFound);
        }

        log::info!("User {} deleted note {}", user_id, note_id);
        Ok(())
    }
}

/// Parse a path segment into a note ID
///
/// IDs are positive integers.
pub fn parse_note_id(raw: &str) -> NoteResult<NoteId> {
    raw.trim()
        .parse::<NoteId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(NoteError::InvalidNoteId)
}
