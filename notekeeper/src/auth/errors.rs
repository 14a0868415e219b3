//! Authentication error types.

use crate::db::timeouts::TimeoutError;
use crate::mail::MailError;
use std::time::Duration;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store call exceeded its deadline
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Passcode did not match the pending one, or none is pending
    #[error("Invalid OTP")]
    InvalidOtp,

    /// Login against an email with no user record
    #[error("No user found with this email")]
    UserNotFound,

    /// Signup against an email that already has a user record
    #[error("User already exists, please log in instead")]
    UserAlreadyExists,

    /// Google ID token failed signature, audience, issuer or payload checks
    #[error("Invalid Google token: {0}")]
    InvalidFederatedToken(String),

    /// Google signing keys could not be fetched
    #[error("Failed to fetch identity provider keys: {0}")]
    KeyFetch(String),

    /// JWT encoding error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Session token signature or encoding is malformed
    #[error("Invalid session token")]
    InvalidSession,

    /// Session token validity window has elapsed
    #[error("Session expired")]
    SessionExpired,

    /// Malformed email address
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Malformed request field
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Mail delivery failed
    #[error("Failed to deliver mail: {0}")]
    TransportFailure(#[from] MailError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database, key-fetch, transport and JWT errors are sanitized to prevent
    /// information disclosure about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Timeout(_) | AuthError::KeyFetch(_) => {
                "Internal server error".to_string()
            }
            AuthError::TransportFailure(_) => "Failed to send OTP".to_string(),
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            AuthError::InvalidFederatedToken(_) => "Invalid Google token".to_string(),
            AuthError::InvalidSession | AuthError::SessionExpired => "Invalid token".to_string(),
            AuthError::InvalidEmail(reason) | AuthError::Validation(reason) => reason.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<TimeoutError> for AuthError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => AuthError::Timeout(duration),
            TimeoutError::Database(e) => AuthError::Database(e),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
