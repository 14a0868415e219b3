//! Authentication middleware for protected endpoints.
//!
//! Extracts the bearer token, verifies it and injects [`AuthUser`] into
//! request extensions for downstream handlers.
//!
//! # Extracting the user
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use nk_server::api::middleware::AuthUser;
//!
//! async fn protected_handler(Extension(AuthUser(user_id)): Extension<AuthUser>) -> String {
//!     format!("Authenticated as user {}", user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use notekeeper::auth::UserId;

use super::{AppState, error::ApiError};
use crate::logging::log_security_event;

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

/// Authentication middleware that validates session tokens and injects the user.
///
/// # Behavior
///
/// - **Success**: Token valid → Injects `AuthUser` → Calls next handler
/// - **Missing header**: Returns `401 Unauthorized`
/// - **Not a `Bearer` header**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `403 Forbidden`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(ApiError::unauthorized)?;

    match state.auth_manager.verify_session(token) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthUser(user_id));
            Ok(next.run(request).await)
        }
        Err(e) => {
            log_security_event("forbidden_token", None, None, &e.to_string());
            Err(ApiError::forbidden())
        }
    }
}
