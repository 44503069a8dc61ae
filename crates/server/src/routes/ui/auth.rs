//! Login, signup and logout pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{PageResult, non_blank};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login and signup form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

impl CredentialsForm {
    fn fields(&self) -> Option<(&str, &str)> {
        Some((non_blank(&self.username)?, non_blank(&self.password)?))
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<String>,
    pub username: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<String>,
    pub username: String,
}

fn login_error(status: StatusCode, message: &str, username: &str) -> Response {
    (
        status,
        LoginTemplate {
            user: None,
            error: Some(message.to_string()),
            username: username.trim().to_string(),
        },
    )
        .into_response()
}

fn signup_error(status: StatusCode, message: &str, username: &str) -> Response {
    (
        status,
        SignupTemplate {
            user: None,
            error: Some(message.to_string()),
            username: username.trim().to_string(),
        },
    )
        .into_response()
}

async fn start_session(session: &Session, user: &User) -> PageResult<Response> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    Ok(Redirect::to("/households").into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login form.
pub async fn login_page(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    LoginTemplate {
        user,
        error: None,
        username: String::new(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> PageResult<Response> {
    let Some((username, password)) = form.fields() else {
        return Ok(login_error(
            StatusCode::BAD_REQUEST,
            "Please fill in both fields.",
            &form.username,
        ));
    };

    match AuthService::new(state.pool()).login(username, password).await {
        Ok(user) => start_session(&session, &user).await,
        Err(AuthError::InvalidCredentials) => {
            tracing::debug!("Login failed");
            Ok(login_error(
                StatusCode::UNAUTHORIZED,
                "Invalid username or password.",
                username,
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the signup form.
pub async fn signup_page(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    SignupTemplate {
        user,
        error: None,
        username: String::new(),
    }
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> PageResult<Response> {
    let Some((username, password)) = form.fields() else {
        return Ok(signup_error(
            StatusCode::BAD_REQUEST,
            "Please fill in both fields.",
            &form.username,
        ));
    };

    match AuthService::new(state.pool()).signup(username, password).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User signed up");
            start_session(&session, &user).await
        }
        Err(AuthError::UsernameTaken) => Ok(signup_error(
            StatusCode::CONFLICT,
            "That username is taken.",
            username,
        )),
        Err(AuthError::InvalidUsername(e)) => Ok(signup_error(
            StatusCode::BAD_REQUEST,
            &format!("{}.", capitalize(&e.to_string())),
            username,
        )),
        Err(e) => Err(e.into()),
    }
}

/// Clear the session and return to the login form.
pub async fn logout(session: Session) -> PageResult<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
