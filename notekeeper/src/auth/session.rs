//! Session token issuance and verification.

use super::{
    errors::{AuthError, AuthResult},
    models::{SessionClaims, UserId},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};

/// Validity window of every session token
pub const SESSION_VALIDITY_DAYS: i64 = 7;

/// Mints and checks HS256 session tokens.
///
/// Tokens are not stored anywhere; possession of a valid token is the session.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl SessionIssuer {
    /// Create an issuer with the standard 7-day validity
    ///
    /// # Arguments
    ///
    /// * `secret` - Secret key for JWT signing
    pub fn new(secret: &str) -> Self {
        Self::with_validity(secret, Duration::days(SESSION_VALIDITY_DAYS))
    }

    /// Create an issuer with a custom validity window
    pub fn with_validity(secret: &str, validity: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        }
    }

    /// Mint a token for `user_id`
    pub fn issue(&self, user_id: UserId) -> AuthResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            exp: (now + self.validity).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(token)
    }

    /// Verify a token and return the user it was issued for
    ///
    /// # Errors
    ///
    /// * `AuthError::SessionExpired` - The validity window has elapsed
    /// * `AuthError::InvalidSession` - Bad signature, encoding or claims
    pub fn verify(&self, token: &str) -> AuthResult<UserId> {
        let token_data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::SessionExpired,
            _ => AuthError::InvalidSession,
        })?;

        Ok(token_data.claims.sub)
    }
}
