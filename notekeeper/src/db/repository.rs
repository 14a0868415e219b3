//! Repository trait definitions for testability and dependency injection.
//!
//! Handlers and managers only see these traits. PostgreSQL implementations
//! live here; in-memory ones are in [`super::memory`].

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::timeouts::{TimeoutError, with_default_timeout};
use crate::auth::{AuthError, AuthResult, NewUser, User, UserId};
use crate::notes::{NewNote, Note, NoteId, NoteResult};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by normalized email
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Insert a user
    ///
    /// # Errors
    ///
    /// * `AuthError::UserAlreadyExists` - The email is taken, including by a
    ///   concurrent insert
    async fn create_user(&self, user: &NewUser) -> AuthResult<User>;
}

/// Trait for note repository operations
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a note
    async fn create_note(&self, note: &NewNote) -> NoteResult<Note>;

    /// Notes owned by `user_id`, newest first
    async fn list_by_owner(&self, user_id: UserId) -> NoteResult<Vec<Note>>;

    /// Delete a note if `user_id` owns it
    ///
    /// Returns `false` when the note is absent or owned by someone else.
    async fn delete_owned(&self, note_id: NoteId, user_id: UserId) -> NoteResult<bool>;
}

const USER_COLUMNS: &str = "id, email, name, dob, google_id, created_at";
const NOTE_COLUMNS: &str = "id, title, user_id, created_at, updated_at";

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        email: r.get("email"),
        name: r.get("name"),
        dob: r.get("dob"),
        google_id: r.get("google_id"),
        created_at: r.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn note_from_row(r: &PgRow) -> Note {
    Note {
        id: r.get("id"),
        title: r.get("title"),
        user_id: r.get("user_id"),
        created_at: r.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        updated_at: r.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
    }
}

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = with_default_timeout(
            sqlx::query(&query).bind(email).fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = with_default_timeout(
            sqlx::query(&query).bind(user_id).fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_user(&self, user: &NewUser) -> AuthResult<User> {
        let query = format!(
            "INSERT INTO users (email, name, dob, google_id) VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&query)
                .bind(&user.email)
                .bind(&user.name)
                .bind(user.dob)
                .bind(&user.google_id)
                .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| match e {
            TimeoutError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                AuthError::UserAlreadyExists
            }
            other => AuthError::from(other),
        })?;

        Ok(user_from_row(&row))
    }
}

/// Default PostgreSQL implementation of `NoteRepository`
pub struct PgNoteRepository {
    pool: PgPool,
}

impl PgNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create_note(&self, note: &NewNote) -> NoteResult<Note> {
        let query = format!(
            "INSERT INTO notes (title, user_id) VALUES ($1, $2) RETURNING {NOTE_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&query)
                .bind(&note.title)
                .bind(note.user_id)
                .fetch_one(&self.pool),
        )
        .await?;

        Ok(note_from_row(&row))
    }

    async fn list_by_owner(&self, user_id: UserId) -> NoteResult<Vec<Note>> {
        let query = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let rows = with_default_timeout(
            sqlx::query(&query).bind(user_id).fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn delete_owned(&self, note_id: NoteId, user_id: UserId) -> NoteResult<bool> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
                .bind(note_id)
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
