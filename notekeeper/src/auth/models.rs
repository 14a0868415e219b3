//! Authentication data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attributes for a user record that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub google_id: Option<String>,
}

impl NewUser {
    /// Attributes carrying only an email
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }
}

/// Request a passcode for an email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
}

/// Verify a passcode and sign up (or silently sign in)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSignupRequest {
    pub name: Option<String>,
    /// Date of birth as `YYYY-MM-DD`
    pub dob: Option<String>,
    pub email: String,
    pub otp: String,
}

/// Verify a passcode for an existing user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpLoginRequest {
    pub email: String,
    pub otp: String,
}

/// Google ID token as produced by Google Identity Services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenRequest {
    pub id_token: String,
}

/// JWT claims for a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,           // User ID
    pub exp: i64,              // Expiration timestamp
    pub iat: i64,              // Issued at timestamp
}

/// Identity asserted by a verified Google ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Provider subject identifier
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

/// Outcome of every successful sign-in flow
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}
