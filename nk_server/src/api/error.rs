//! Mapping from domain errors to HTTP responses.
//!
//! Every failure leaves the server as `{"error": "<message>"}` with the status
//! the error kind calls for. Internal details are logged, never returned.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notekeeper::{AuthError, NoteError};
use serde::{Deserialize, Serialize};

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error ready to be rendered as a response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Missing or malformed credentials
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    /// Credentials present but rejected
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Invalid token")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::InvalidOtp
            | AuthError::UserAlreadyExists
            | AuthError::InvalidFederatedToken(_)
            | AuthError::InvalidEmail(_)
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidSession | AuthError::SessionExpired => StatusCode::FORBIDDEN,
            AuthError::Database(_)
            | AuthError::Timeout(_)
            | AuthError::KeyFetch(_)
            | AuthError::JwtError(_)
            | AuthError::TransportFailure(_) => {
                tracing::error!(error = %err, "Authentication failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self::new(status, err.client_message())
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        let status = match &err {
            NoteError::TitleRequired | NoteError::InvalidNoteId => StatusCode::BAD_REQUEST,
            NoteError::NotFound => StatusCode::NOT_FOUND,
            NoteError::Database(_) | NoteError::Timeout(_) => {
                tracing::error!(error = %err, "Note store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self::new(status, err.client_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}
