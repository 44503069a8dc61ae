//! Auth API: signup, login, logout.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use petcare_core::UserId;

use super::JsonBody;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Signup and login request body.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both fields, or a 400 if either is missing or empty.
    fn require(&self) -> Result<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.is_empty() =>
            {
                Ok((username, password))
            }
            _ => Err(AppError::BadRequest(
                "username and password required".to_string(),
            )),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_owned(),
        }
    }
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    Ok(())
}

/// Create an account and log it in.
///
/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    let (username, password) = body.require()?;

    let user = AuthService::new(state.pool())
        .signup(username, password)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Log in.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<Json<UserResponse>> {
    let (username, password) = body.require()?;

    let user = AuthService::new(state.pool())
        .login(username, password)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "API login failed"))?;
    start_session(&session, &user).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// Log out. Always succeeds.
///
/// POST /api/v1/auth/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
