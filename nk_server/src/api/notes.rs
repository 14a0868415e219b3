//! Note API handlers.
//!
//! All routes require a session; every query is scoped to the caller.

use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use notekeeper::notes::{CreateNoteRequest, Note};

use super::{
    AppState,
    auth::SuccessResponse,
    error::ApiResult,
    middleware::AuthUser,
};
use crate::metrics;

/// `POST /api/notes`
///
/// # Errors
///
/// - `400 Bad Request`: Missing or blank title
pub async fn create_note(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let Json(request) = payload?;

    let note = state.note_manager.create(user_id, request).await?;
    metrics::notes_created_total();

    Ok((StatusCode::CREATED, Json(note)))
}

/// `GET /api/notes`, newest first
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(state.note_manager.list(user_id).await?))
}

/// `DELETE /api/notes/{id}`
///
/// # Errors
///
/// - `400 Bad Request`: `id` is not a note ID
/// - `404 Not Found`: No such note owned by the caller
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(note_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state.note_manager.delete(user_id, &note_id).await?;
    metrics::notes_deleted_total();

    Ok(Json(SuccessResponse { success: true }))
}
