//! Current-user endpoint.

use axum::{Json, extract::Extension, extract::State};
use notekeeper::auth::UserId;
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiResult, middleware::AuthUser};

/// Public profile of the signed-in user
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}

/// `GET /api/user/me`
pub async fn me(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state.auth_manager.current_user(user_id).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}
