//! Household pages: list, create, dashboard, join and leave.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use petcare_core::HouseholdId;

use super::{PagePath, PageResult, non_blank};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Household, MemberProfile, Membership, Pet};
use crate::services::{HouseholdService, PetService, RejoinPolicy, ServiceError};
use crate::state::AppState;

const DEFAULT_OWNER_NICKNAME: &str = "Owner";

// =============================================================================
// Form Types
// =============================================================================

/// New household form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewHouseholdForm {
    pub name: String,
    pub nickname: String,
}

/// Join form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JoinForm {
    pub code: String,
    pub nickname: String,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "households/index.html")]
pub struct IndexTemplate {
    pub user: Option<CurrentUser>,
    pub memberships: Vec<Membership>,
}

#[derive(Template, WebTemplate)]
#[template(path = "households/new.html")]
pub struct NewTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<String>,
    pub name: String,
    pub nickname: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "households/show.html")]
pub struct ShowTemplate {
    pub user: Option<CurrentUser>,
    pub household: Household,
    pub pets: Vec<Pet>,
    pub members: Vec<MemberProfile>,
}

#[derive(Template, WebTemplate)]
#[template(path = "join.html")]
pub struct JoinTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<String>,
    pub existing_household: Option<Household>,
    pub code: String,
    pub nickname: String,
}

fn dashboard(id: HouseholdId) -> Redirect {
    Redirect::to(&format!("/households/{id}"))
}

// =============================================================================
// Handlers
// =============================================================================

/// List the user's households.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> PageResult<impl IntoResponse> {
    let memberships = HouseholdService::new(state.pool())
        .memberships(user.id)
        .await?;

    Ok(IndexTemplate {
        user: Some(user),
        memberships,
    })
}

/// Display the new household form.
pub async fn new_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    NewTemplate {
        user: Some(user),
        error: None,
        name: String::new(),
        nickname: String::new(),
    }
}

/// Create a household and open its dashboard.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<NewHouseholdForm>,
) -> PageResult<Response> {
    let Some(name) = non_blank(&form.name) else {
        return Ok(NewTemplate {
            error: Some("Household name is required.".to_string()),
            name: form.name.clone(),
            nickname: form.nickname.clone(),
            user: Some(user),
        }
        .into_response());
    };
    let nickname = non_blank(&form.nickname)
        .or_else(|| non_blank(&user.username))
        .unwrap_or(DEFAULT_OWNER_NICKNAME);

    let (household, _) = HouseholdService::new(state.pool())
        .create(user.id, name, nickname)
        .await?;

    Ok(dashboard(household.id).into_response())
}

/// Household dashboard with pets and members.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath(id): PagePath<HouseholdId>,
) -> PageResult<impl IntoResponse> {
    let households = HouseholdService::new(state.pool());
    let household = households.get(user.id, id).await?;
    let pets = PetService::new(state.pool()).list(user.id, id).await?;
    let members = households.members(user.id, id).await?;

    Ok(ShowTemplate {
        user: Some(user),
        household,
        pets,
        members,
    })
}

/// Leave a household.
pub async fn leave(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath(id): PagePath<HouseholdId>,
) -> PageResult<Redirect> {
    HouseholdService::new(state.pool()).leave(user.id, id).await?;
    Ok(Redirect::to("/households"))
}

/// Display the join form.
pub async fn join_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    JoinTemplate {
        user: Some(user),
        error: None,
        existing_household: None,
        code: String::new(),
        nickname: String::new(),
    }
}

/// Join a household by code.
pub async fn join(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<JoinForm>,
) -> PageResult<Response> {
    let render = |user: CurrentUser, error: &str, existing_household: Option<Household>| {
        JoinTemplate {
            user: Some(user),
            error: Some(error.to_string()),
            existing_household,
            code: form.code.trim().to_string(),
            nickname: form.nickname.trim().to_string(),
        }
        .into_response()
    };

    let Some(code) = non_blank(&form.code) else {
        return Ok(render(user, "Join code is required.", None));
    };
    let nickname = non_blank(&form.nickname).unwrap_or(&user.username);

    let result = HouseholdService::new(state.pool())
        .join(user.id, code, nickname, RejoinPolicy::Reject)
        .await;

    match result {
        Ok(outcome) => Ok(dashboard(outcome.household.id).into_response()),
        Err(ServiceError::InvalidJoinCode) => Ok(render(
            user,
            "Invalid join code. Please try again.",
            None,
        )),
        Err(ServiceError::AlreadyMember(household)) => Ok(render(
            user,
            "You're already a member of this household.",
            Some(*household),
        )),
        Err(ServiceError::NicknameTaken) => Ok(render(
            user,
            "Nickname already in use in this household. Try another.",
            None,
        )),
        Err(e) => Err(e.into()),
    }
}
