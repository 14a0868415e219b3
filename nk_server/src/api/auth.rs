//! Authentication API handlers.
//!
//! Five public endpoints: request a passcode, then exchange it for a session
//! (signup or login), or exchange a Google ID token for one.
//!
//! # Examples
//!
//! Request a passcode:
//! ```bash
//! curl -X POST http://localhost:5000/api/auth/send-otp \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "ada@example.com"}'
//! ```
//!
//! Sign up with it:
//! ```bash
//! curl -X POST http://localhost:5000/api/auth/verify-otp-signup \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Ada", "dob": "1990-05-17", "email": "ada@example.com", "otp": "123456"}'
//! ```

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use notekeeper::auth::{
    AuthError, AuthSession, GoogleTokenRequest, OtpDispatch, OtpLoginRequest, OtpSignupRequest,
    SendOtpRequest, User,
};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    error::{ApiError, ApiResult},
};
use crate::{logging::log_security_event, metrics};

/// Body of endpoints that only report success
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Body returned by every successful sign-in
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            success: true,
            token: session.token,
            user: session.user,
        }
    }
}

/// Issue a passcode and mail it.
///
/// Always `200 OK` for a well-formed email, whether or not the mail went out.
pub async fn send_otp(
    State(state): State<AppState>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;

    let dispatch = state.auth_manager.send_otp(request).await?;
    metrics::otp_sent_total(dispatch == OtpDispatch::Delivered);

    Ok(Json(SuccessResponse { success: true }))
}

/// Verify a passcode and sign up.
///
/// An existing user with the same email is signed in instead.
///
/// # Errors
///
/// - `400 Bad Request`: Wrong or reused passcode, malformed email or date of birth
pub async fn verify_otp_signup(
    State(state): State<AppState>,
    payload: Result<Json<OtpSignupRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let email = request.email.clone();

    let result = state.auth_manager.verify_otp_signup(request).await;
    finish("otp_signup", &email, result)
}

/// Verify a passcode for an existing user.
///
/// # Errors
///
/// - `404 Not Found`: No user with this email
/// - `400 Bad Request`: Wrong or reused passcode
pub async fn verify_otp_login(
    State(state): State<AppState>,
    payload: Result<Json<OtpLoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let email = request.email.clone();

    let result = state.auth_manager.verify_otp_login(request).await;
    finish("otp_login", &email, result)
}

/// Sign in with Google, creating the user on first use.
///
/// # Errors
///
/// - `400 Bad Request`: Token failed verification
pub async fn google_login(
    State(state): State<AppState>,
    payload: Result<Json<GoogleTokenRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload?;

    let result = state.auth_manager.google_login(&request.id_token).await;
    finish("google_login", "", result)
}

/// Sign up with Google.
///
/// # Errors
///
/// - `400 Bad Request`: Token failed verification, or the email already has a user
pub async fn google_signup(
    State(state): State<AppState>,
    payload: Result<Json<GoogleTokenRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload?;

    let result = state.auth_manager.google_signup(&request.id_token).await;
    finish("google_signup", "", result)
}

fn finish(
    method: &'static str,
    email: &str,
    result: Result<AuthSession, AuthError>,
) -> ApiResult<Json<AuthResponse>> {
    let subject = Some(email).filter(|e| !e.is_empty());

    let outcome = match &result {
        Ok(_) => "success",
        Err(AuthError::InvalidOtp) => {
            log_security_event("invalid_otp", None, subject, "OTP rejected");
            "invalid_otp"
        }
        Err(AuthError::UserNotFound) => "user_not_found",
        Err(AuthError::UserAlreadyExists) => {
            log_security_event("google_signup_conflict", None, subject, "User already exists");
            "user_exists"
        }
        Err(AuthError::InvalidFederatedToken(reason)) => {
            log_security_event("invalid_google_token", None, subject, reason);
            "invalid_token"
        }
        Err(_) => "error",
    };
    metrics::logins_total(method, outcome);

    let session = result?;
    tracing::info!(user_id = session.user.id, method = method, "Signed in");
    Ok(Json(session.into()))
}
