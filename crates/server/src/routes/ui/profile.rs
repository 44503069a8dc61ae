//! Profile page: change username and per-household nicknames.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use petcare_core::HouseholdId;

use super::{PagePath, PageResult, non_blank};
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, Membership};
use crate::services::{AuthError, AuthService, HouseholdService, ServiceError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UsernameForm {
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NicknameForm {
    pub nickname: String,
}

/// A membership row on the profile page with its own inline error.
pub struct MembershipRow {
    pub membership: Membership,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub user: Option<CurrentUser>,
    pub username_error: Option<String>,
    pub username: String,
    pub memberships: Vec<MembershipRow>,
}

/// Error to show on the profile page.
enum ProfileError {
    Username(&'static str),
    Nickname(HouseholdId, &'static str),
}

async fn render(
    state: &AppState,
    user: CurrentUser,
    error: Option<ProfileError>,
) -> PageResult<ProfileTemplate> {
    let current = AuthService::new(state.pool()).get_user(user.id).await?;
    let memberships = HouseholdService::new(state.pool())
        .memberships(user.id)
        .await?;

    let (username_error, nickname_error) = match error {
        Some(ProfileError::Username(message)) => (Some(message.to_string()), None),
        Some(ProfileError::Nickname(id, message)) => (None, Some((id, message))),
        None => (None, None),
    };

    let memberships = memberships
        .into_iter()
        .map(|membership| {
            let error = nickname_error
                .filter(|(id, _)| *id == membership.household_id)
                .map(|(_, message)| message.to_string());
            MembershipRow { membership, error }
        })
        .collect();

    Ok(ProfileTemplate {
        user: Some(user),
        username_error,
        username: current.username.into_inner(),
        memberships,
    })
}

/// Show the profile page.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> PageResult<ProfileTemplate> {
    render(&state, user, None).await
}

/// Change the current user's username.
pub async fn update_username(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UsernameForm>,
) -> PageResult<Response> {
    let Some(username) = non_blank(&form.username) else {
        let error = ProfileError::Username("Username cannot be empty.");
        return Ok(render(&state, user, Some(error)).await?.into_response());
    };

    match AuthService::new(state.pool()).rename(user.id, username).await {
        Ok(renamed) => {
            set_current_user(&session, &CurrentUser::from(&renamed)).await?;
            tracing::info!(user_id = %renamed.id, "Username changed");
            Ok(Redirect::to("/profile").into_response())
        }
        Err(AuthError::UsernameTaken) => {
            let error = ProfileError::Username("That username is already taken.");
            Ok(render(&state, user, Some(error)).await?.into_response())
        }
        Err(AuthError::InvalidUsername(_)) => {
            let error = ProfileError::Username("That username is too long.");
            Ok(render(&state, user, Some(error)).await?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Change the current user's nickname in one household.
pub async fn update_nickname(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath(household_id): PagePath<HouseholdId>,
    Form(form): Form<NicknameForm>,
) -> PageResult<Response> {
    let Some(nickname) = non_blank(&form.nickname) else {
        let error = ProfileError::Nickname(household_id, "Nickname cannot be empty.");
        return Ok(render(&state, user, Some(error)).await?.into_response());
    };

    match HouseholdService::new(state.pool())
        .set_nickname(user.id, household_id, nickname)
        .await
    {
        Ok(_) | Err(ServiceError::NotFound | ServiceError::Forbidden) => {
            Ok(Redirect::to("/profile").into_response())
        }
        Err(ServiceError::NicknameTaken) => {
            let error = ProfileError::Nickname(
                household_id,
                "That nickname is already used in this household.",
            );
            Ok(render(&state, user, Some(error)).await?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
