//! Authentication manager implementation.
//!
//! Orchestrates the OTP store, identity resolver and session issuer into the
//! five sign-in flows. Within a flow, passcode consumption happens before
//! identity resolution, which happens before token issuance.

use super::{
    errors::{AuthError, AuthResult},
    google::FederatedVerifier,
    identity::IdentityResolver,
    models::{
        AuthSession, NewUser, OtpLoginRequest, OtpSignupRequest, SendOtpRequest, User, UserId,
    },
    otp::{OtpIssuer, OtpStore},
    session::SessionIssuer,
};
use crate::{db::UserRepository, mail::MailTransport};
use chrono::NaiveDate;
use std::{sync::Arc, time::Duration};

/// Whether a passcode mail left the building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpDispatch {
    Delivered,
    /// The transport failed; the passcode is still pending
    Undelivered,
}

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    otp_store: Arc<dyn OtpStore>,
    otp_issuer: OtpIssuer,
    identity: IdentityResolver,
    sessions: SessionIssuer,
    federated: Arc<dyn FederatedVerifier>,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User record storage
    /// * `otp_store` - Pending passcode storage
    /// * `mailer` - Transport for passcode mails
    /// * `federated` - Google ID token verifier
    /// * `sessions` - Session token issuer
    pub fn new(
        users: Arc<dyn UserRepository>,
        otp_store: Arc<dyn OtpStore>,
        mailer: Arc<dyn MailTransport>,
        federated: Arc<dyn FederatedVerifier>,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            otp_issuer: OtpIssuer::new(otp_store.clone(), mailer),
            otp_store,
            identity: IdentityResolver::new(users),
            sessions,
            federated,
        }
    }

    /// Mention a passcode expiry in outgoing mails
    pub fn with_advertised_otp_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.otp_issuer = self.otp_issuer.with_advertised_ttl(ttl);
        self
    }

    /// Issue and mail a passcode
    ///
    /// Works for known and unknown emails alike. A failed delivery is logged
    /// and reported as [`OtpDispatch::Undelivered`], never as an error.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Malformed email
    pub async fn send_otp(&self, request: SendOtpRequest) -> AuthResult<OtpDispatch> {
        let email = normalize_email(&request.email)?;

        match self.otp_issuer.issue(&email).await {
            Ok(()) => {
                log::info!("OTP sent to {}", email);
                Ok(OtpDispatch::Delivered)
            }
            Err(AuthError::TransportFailure(e)) => {
                log::error!("Error sending OTP to {}: {}", email, e);
                Ok(OtpDispatch::Undelivered)
            }
            Err(e) => Err(e),
        }
    }

    /// Verify a passcode and sign up
    ///
    /// An email that already has a user record is signed in unchanged.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidOtp` - Passcode mismatch or none pending
    /// * `AuthError::Validation` - Malformed date of birth
    pub async fn verify_otp_signup(&self, request: OtpSignupRequest) -> AuthResult<AuthSession> {
        let email = normalize_email(&request.email)?;
        let dob = parse_dob(request.dob.as_deref())?;

        if !self.otp_store.consume(&email, request.otp.trim()).await? {
            return Err(AuthError::InvalidOtp);
        }

        let user = self
            .identity
            .resolve_or_create(NewUser {
                email,
                name: clean_name(request.name),
                dob,
                google_id: None,
            })
            .await?;

        self.start_session(user)
    }

    /// Verify a passcode for an existing user
    ///
    /// The user check runs first, so an unknown email never consumes a passcode.
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No user with this email
    /// * `AuthError::InvalidOtp` - Passcode mismatch or none pending
    pub async fn verify_otp_login(&self, request: OtpLoginRequest) -> AuthResult<AuthSession> {
        let email = normalize_email(&request.email)?;

        let user = self
            .identity
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.otp_store.consume(&email, request.otp.trim()).await? {
            return Err(AuthError::InvalidOtp);
        }

        self.start_session(user)
    }

    /// Sign in with a Google ID token, creating the user when needed
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidFederatedToken` - Token rejected
    pub async fn google_login(&self, id_token: &str) -> AuthResult<AuthSession> {
        let identity = self.federated.verify(id_token).await?;
        let email = normalize_email(&identity.email)?;

        let user = self
            .identity
            .resolve_or_create(NewUser {
                email,
                name: clean_name(identity.name),
                dob: None,
                google_id: Some(identity.subject),
            })
            .await?;

        self.start_session(user)
    }

    /// Sign up with a Google ID token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidFederatedToken` - Token rejected
    /// * `AuthError::UserAlreadyExists` - The verified email already has a user
    pub async fn google_signup(&self, id_token: &str) -> AuthResult<AuthSession> {
        let identity = self.federated.verify(id_token).await?;
        let email = normalize_email(&identity.email)?;

        if self.identity.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = self
            .identity
            .create(NewUser {
                email,
                name: clean_name(identity.name),
                dob: None,
                google_id: Some(identity.subject),
            })
            .await?;

        self.start_session(user)
    }

    /// Verify a session token
    ///
    /// # Errors
    ///
    /// * `AuthError::SessionExpired` - Token too old
    /// * `AuthError::InvalidSession` - Token malformed or forged
    pub fn verify_session(&self, token: &str) -> AuthResult<UserId> {
        self.sessions.verify(token)
    }

    /// Fetch the user a session belongs to
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - The user no longer exists
    pub async fn current_user(&self, user_id: UserId) -> AuthResult<User> {
        self.identity
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    fn start_session(&self, user: User) -> AuthResult<AuthSession> {
        let token = self.sessions.issue(user.id)?;
        Ok(AuthSession { token, user })
    }
}

/// Trim and lower-case an email, rejecting obviously malformed ones
///
/// # Errors
///
/// * `AuthError::InvalidEmail` - Empty, missing `@`, or missing local/domain part
pub fn normalize_email(raw: &str) -> AuthResult<String> {
    let email = raw.trim().to_lowercase();

    if email.is_empty() {
        return Err(AuthError::InvalidEmail("Email is required".to_string()));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(AuthError::InvalidEmail(
            "Please enter a valid email".to_string(),
        ));
    }

    Ok(email)
}

fn parse_dob(raw: Option<&str>) -> AuthResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AuthError::Validation("Date of birth must be YYYY-MM-DD".to_string())),
    }
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
