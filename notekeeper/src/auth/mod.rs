//! Authentication module providing passwordless sign-in and session management.
//!
//! This module implements:
//! - Email one-time passcodes (6 digits, single use, one pending code per email)
//! - Google sign-in via ID token verification against Google's published keys
//! - Find-or-create identity resolution keyed on email
//! - JWT session tokens (7-day expiry, stateless)
//!
//! ## Flows
//!
//! | Flow | Existing user | New user |
//! |------|---------------|----------|
//! | `verify_otp_signup` | signed in | created |
//! | `verify_otp_login` | signed in | `UserNotFound` |
//! | `google_login` | signed in | created |
//! | `google_signup` | `UserAlreadyExists` | created |
//!
//! ## Example
//!
//! ```no_run
//! use notekeeper::auth::{AuthManager, OtpSignupRequest, SendOtpRequest, SessionIssuer};
//! use notekeeper::auth::google::GoogleVerifier;
//! use notekeeper::auth::otp::InMemoryOtpStore;
//! use notekeeper::db::MemoryUserRepository;
//! use notekeeper::mail::LogMailer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryUserRepository::new()),
//!         Arc::new(InMemoryOtpStore::new()),
//!         Arc::new(LogMailer),
//!         Arc::new(GoogleVerifier::new("client-id.apps.googleusercontent.com")),
//!         SessionIssuer::new("a_jwt_secret_that_is_long_enough_for_hs256"),
//!     );
//!
//!     auth.send_otp(SendOtpRequest { email: "a@example.com".to_string() }).await?;
//!
//!     let session = auth
//!         .verify_otp_signup(OtpSignupRequest {
//!             name: Some("A".to_string()),
//!             dob: Some("2000-01-01".to_string()),
//!             email: "a@example.com".to_string(),
//!             otp: "123456".to_string(),
//!         })
//!         .await?;
//!     println!("Signed in as user {}", session.user.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod google;
pub mod identity;
pub mod manager;
pub mod models;
pub mod otp;
pub mod session;

pub use errors::{AuthError, AuthResult};
pub use google::{FederatedVerifier, GoogleVerifier};
pub use identity::IdentityResolver;
pub use manager::{AuthManager, OtpDispatch};
pub use models::{
    AuthSession, FederatedIdentity, GoogleTokenRequest, NewUser, OtpLoginRequest,
    OtpSignupRequest, SendOtpRequest, SessionClaims, User, UserId,
};
pub use otp::{InMemoryOtpStore, OtpIssuer, OtpStore};
pub use session::SessionIssuer;
