//! Owner-scoped notes.
//!
//! Every operation takes the owning user's id; a note is never visible to,
//! or deletable by, anyone else.
//!
//! ## Example
//!
//! ```no_run
//! use notekeeper::db::MemoryNoteRepository;
//! use notekeeper::notes::{CreateNoteRequest, NoteManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let notes = NoteManager::new(Arc::new(MemoryNoteRepository::new()));
//!
//!     let note = notes
//!         .create(1, CreateNoteRequest { title: "Buy milk".to_string() })
//!         .await?;
//!     println!("Created note {}", note.id);
//!
//!     for note in notes.list(1).await? {
//!         println!("{}: {}", note.id, note.title);
//!     }
//!
//!     notes.delete(1, &note.id.to_string()).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{NoteError, NoteResult};
pub use manager::NoteManager;
pub use models::{CreateNoteRequest, NewNote, Note, NoteId};
