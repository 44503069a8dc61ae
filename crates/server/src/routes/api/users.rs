//! Current-user API.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;

use super::auth::UserResponse;
use super::{JsonBody, non_blank};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Rename request body.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeRequest {
    pub username: Option<String>,
}

/// Show the logged-in user.
///
/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<UserResponse>> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Change the logged-in user's username.
///
/// PATCH /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    JsonBody(body): JsonBody<UpdateMeRequest>,
) -> Result<Json<UserResponse>> {
    let username = non_blank(body.username.as_deref())
        .ok_or_else(|| AppError::BadRequest("username is required".to_string()))?;

    let user = AuthService::new(state.pool())
        .rename(current.id, username)
        .await?;
    set_current_user(&session, &CurrentUser::from(&user)).await?;

    Ok(Json(UserResponse::from(&user)))
}
