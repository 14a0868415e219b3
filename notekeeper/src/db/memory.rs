//! In-memory repositories.
//!
//! Used by tests and by the server when no database URL is configured. State
//! lives only as long as the process.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::repository::{NoteRepository, UserRepository};
use crate::auth::{AuthError, AuthResult, NewUser, User, UserId};
use crate::notes::{NewNote, Note, NoteId, NoteResult};

#[derive(Debug, Default)]
struct UserTable {
    rows: HashMap<UserId, User>,
    last_id: UserId,
}

/// `UserRepository` backed by a map
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: Mutex<UserTable>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let table = self.table.lock().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.table.lock().await.rows.get(&user_id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> AuthResult<User> {
        // Uniqueness check and insert under one lock
        let mut table = self.table.lock().await;

        if table.rows.values().any(|u| u.email == user.email) {
            return Err(AuthError::UserAlreadyExists);
        }

        table.last_id += 1;
        let created = User {
            id: table.last_id,
            email: user.email.clone(),
            name: user.name.clone(),
            dob: user.dob,
            google_id: user.google_id.clone(),
            created_at: Utc::now(),
        };
        table.rows.insert(created.id, created.clone());

        Ok(created)
    }
}

#[derive(Debug, Default)]
struct NoteTable {
    rows: Vec<Note>,
    last_id: NoteId,
}

/// `NoteRepository` backed by a vector in insertion order
#[derive(Debug, Default)]
pub struct MemoryNoteRepository {
    table: Mutex<NoteTable>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn create_note(&self, note: &NewNote) -> NoteResult<Note> {
        let mut table = self.table.lock().await;

        table.last_id += 1;
        let now = Utc::now();
        let created = Note {
            id: table.last_id,
            title: note.title.clone(),
            user_id: note.user_id,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(created.clone());

        Ok(created)
    }

    async fn list_by_owner(&self, user_id: UserId) -> NoteResult<Vec<Note>> {
        let table = self.table.lock().await;
        let mut notes: Vec<Note> = table
            .rows
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();

        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn delete_owned(&self, note_id: NoteId, user_id: UserId) -> NoteResult<bool> {
        let mut table = self.table.lock().await;
        let before = table.rows.len();
        table
            .rows
            .retain(|n| !(n.id == note_id && n.user_id == user_id));
        Ok(table.rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_ids_are_sequential() {
        let users = MemoryUserRepository::new();
        let a = users.create_user(&NewUser::with_email("a@x.com")).await.unwrap();
        let b = users.create_user(&NewUser::with_email("b@x.com")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(users.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let users = MemoryUserRepository::new();
        users.create_user(&NewUser::with_email("a@x.com")).await.unwrap();

        let result = users.create_user(&NewUser::with_email("a@x.com")).await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
        assert_eq!(users.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_email_and_id() {
        let users = MemoryUserRepository::new();
        assert!(users.is_empty().await);
        let created = users.create_user(&NewUser::with_email("a@x.com")).await.unwrap();

        assert_eq!(users.find_by_email("a@x.com").await.unwrap(), Some(created.clone()));
        assert_eq!(users.find_by_id(created.id).await.unwrap(), Some(created));
        assert_eq!(users.find_by_email("b@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_newest_first() {
        let notes = MemoryNoteRepository::new();
        for (title, owner) in [("first", 1), ("other", 2), ("second", 1), ("third", 1)] {
            notes
                .create_note(&NewNote {
                    title: title.to_string(),
                    user_id: owner,
                })
                .await
                .unwrap();
        }

        let titles: Vec<String> = notes
            .list_by_owner(1)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();

        assert_eq!(titles, vec!["third", "second", "first"]);
        assert_eq!(notes.list_by_owner(2).await.unwrap().len(), 1);
        assert!(notes.list_by_owner(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_owned_checks_owner() {
        let notes = MemoryNoteRepository::new();
        let note = notes
            .create_note(&NewNote {
                title: "mine".to_string(),
                user_id: 1,
            })
            .await
            .unwrap();

        assert!(!notes.delete_owned(note.id, 2).await.unwrap());
        assert!(notes.delete_owned(note.id, 1).await.unwrap());
        assert!(!notes.delete_owned(note.id, 1).await.unwrap());
    }
}
