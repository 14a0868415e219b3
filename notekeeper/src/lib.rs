//! # NoteKeeper
//!
//! Passwordless note keeping. Users prove control of an email address with a
//! one-time passcode (OTP) or sign in with Google, receive a signed session token,
//! and then manage a private list of notes.
//!
//! ## Architecture
//!
//! Every sign-in path converges on the same two steps: resolve (or create) the user
//! record for a verified email, then mint a session token for it.
//!
//! - **OTP store**: at most one pending passcode per email, consumed exactly once
//! - **OTP issuer**: generates a passcode, stores it, mails it
//! - **Identity resolver**: find-or-create a user by email
//! - **Session issuer**: 7-day HS256 JWTs
//! - **Auth manager**: the five sign-in flows and their policy
//!
//! ## Core Modules
//!
//! - [`auth`]: OTP, identity, sessions, Google verification and the flows that tie them together
//! - [`notes`]: owner-scoped note management
//! - [`mail`]: outgoing mail transports
//! - [`db`]: connection pool, repositories and query timeouts
//!
//! ## Example
//!
//! ```
//! use notekeeper::auth::otp::generate_code;
//!
//! let code = generate_code();
//! assert_eq!(code.len(), 6);
//! ```

/// Authentication: OTP, identity resolution, sessions and sign-in flows.
pub mod auth;

/// Persistence: connection pool, repositories and timeouts.
pub mod db;

/// Outgoing mail transports.
pub mod mail;

/// Owner-scoped notes.
pub mod notes;

pub use auth::{AuthError, AuthManager, AuthResult};
pub use notes::{NoteError, NoteManager, NoteResult};
