//! Persistence for users and notes.
//!
//! [`Database`] owns the PostgreSQL pool. Opening it also brings the schema up
//! to date, so a handle always points at a usable store. The rest of the crate
//! only sees the repository traits, which also have in-memory implementations.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::{sync::Arc, time::Duration};

pub mod config;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::{MemoryNoteRepository, MemoryUserRepository};
pub use repository::{NoteRepository, PgNoteRepository, PgUserRepository, UserRepository};

use timeouts::{MIGRATION_TIMEOUT, TimeoutResult, with_default_timeout, with_timeout};

/// Handle to a migrated PostgreSQL store
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect and apply pending migrations
    ///
    /// # Errors
    ///
    /// * `TimeoutError::Database` - Connection or migration failed
    /// * `TimeoutError::Timeout` - Migrations exceeded [`MIGRATION_TIMEOUT`]
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use notekeeper::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = DatabaseConfig::with_url("postgres://postgres@localhost/notekeeper");
    ///     let db = Database::open(&config).await?;
    ///     let notes = db.note_repository();
    ///     println!("{:?}", notes.list_by_owner(1).await?);
    ///     Ok(())
    /// }
    /// ```
    pub async fn open(config: &DatabaseConfig) -> TimeoutResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        with_timeout(MIGRATION_TIMEOUT, async {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(sqlx::Error::from)
        })
        .await?;

        log::info!("Database schema is up to date");
        Ok(Self { pool })
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        Arc::new(PgUserRepository::new(self.pool.clone()))
    }

    pub fn note_repository(&self) -> Arc<dyn NoteRepository> {
        Arc::new(PgNoteRepository::new(self.pool.clone()))
    }

    /// Check that the store answers and the schema is in place
    pub async fn health_check(&self) -> TimeoutResult<()> {
        with_default_timeout(
            sqlx::query("SELECT 1 FROM users, notes LIMIT 1").execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
