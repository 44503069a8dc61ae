//! Households API: list, create, show, rename, delete, join, leave, members.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use petcare_core::{HouseholdId, JoinCode, MemberId, UserId};

use super::{ApiPath, JsonBody, non_blank};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Household, MemberProfile, Membership};
use crate::services::{HouseholdService, RejoinPolicy};
use crate::state::AppState;

const DEFAULT_OWNER_NICKNAME: &str = "Owner";
const DEFAULT_MEMBER_NICKNAME: &str = "Member";

// =============================================================================
// Request / response bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateHouseholdRequest {
    pub name: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHouseholdRequest {
    pub name: Option<String>,
}

/// Join request; the code may be sent as `join_code` or `code`.
#[derive(Debug, Default, Deserialize)]
pub struct JoinRequest {
    pub join_code: Option<String>,
    pub code: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HouseholdResponse {
    pub id: HouseholdId,
    pub name: String,
    pub join_code: JoinCode,
}

impl From<Household> for HouseholdResponse {
    fn from(household: Household) -> Self {
        Self {
            id: household.id,
            name: household.name,
            join_code: household.join_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: HouseholdId,
    pub name: String,
    pub join_code: JoinCode,
    pub nickname: String,
}

impl From<Membership> for MembershipResponse {
    fn from(membership: Membership) -> Self {
        Self {
            id: membership.household_id,
            name: membership.household_name,
            join_code: membership.join_code,
            nickname: membership.nickname,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub member_id: MemberId,
    pub user_id: UserId,
    pub username: String,
    pub nickname: String,
}

impl From<MemberProfile> for MemberResponse {
    fn from(profile: MemberProfile) -> Self {
        Self {
            member_id: profile.member_id,
            user_id: profile.user_id,
            username: profile.username,
            nickname: profile.nickname,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub household_id: HouseholdId,
    pub household_name: String,
    pub member_id: MemberId,
    pub user: String,
    pub nickname: String,
}

fn require_name(name: Option<&str>) -> Result<&str> {
    non_blank(name).ok_or_else(|| AppError::BadRequest("name is required".to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// List the caller's households.
///
/// GET /api/v1/households
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<MembershipResponse>>> {
    let memberships = HouseholdService::new(state.pool())
        .memberships(user.id)
        .await?;

    Ok(Json(memberships.into_iter().map(Into::into).collect()))
}

/// Create a household; the caller becomes its first member.
///
/// POST /api/v1/households
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<CreateHouseholdRequest>,
) -> Result<impl IntoResponse> {
    let name = require_name(body.name.as_deref())?;
    let nickname = non_blank(body.nickname.as_deref()).unwrap_or(DEFAULT_OWNER_NICKNAME);

    let (household, _) = HouseholdService::new(state.pool())
        .create(user.id, name, nickname)
        .await?;

    let location = format!("/api/v1/households/{}", household.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(HouseholdResponse::from(household)),
    ))
}

/// Show a household.
///
/// GET /api/v1/households/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<HouseholdId>,
) -> Result<Json<HouseholdResponse>> {
    let household = HouseholdService::new(state.pool()).get(user.id, id).await?;
    Ok(Json(household.into()))
}

/// Rename a household.
///
/// PATCH /api/v1/households/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<HouseholdId>,
    JsonBody(body): JsonBody<UpdateHouseholdRequest>,
) -> Result<Json<HouseholdResponse>> {
    let households = HouseholdService::new(state.pool());
    households.require_member(user.id, id).await?;

    let name = require_name(body.name.as_deref())?;
    let household = households.rename(user.id, id, name).await?;
    Ok(Json(household.into()))
}

/// Delete a household with its pets and entries.
///
/// DELETE /api/v1/households/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<HouseholdId>,
) -> Result<StatusCode> {
    HouseholdService::new(state.pool()).delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a household's members.
///
/// GET /api/v1/households/{id}/members
pub async fn members(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<HouseholdId>,
) -> Result<Json<Vec<MemberResponse>>> {
    let members = HouseholdService::new(state.pool())
        .members(user.id, id)
        .await?;

    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Leave a household.
///
/// POST /api/v1/households/{id}/leave
pub async fn leave(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<HouseholdId>,
) -> Result<StatusCode> {
    HouseholdService::new(state.pool()).leave(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Join a household by code. Re-joining updates the nickname.
///
/// POST /api/v1/households/join
pub async fn join(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<JoinRequest>,
) -> Result<impl IntoResponse> {
    // `code` is only consulted when `join_code` is absent
    let raw_code = body.join_code.or(body.code);
    let code = non_blank(raw_code.as_deref())
        .ok_or_else(|| AppError::BadRequest("join_code is required".to_string()))?;
    let nickname = non_blank(body.nickname.as_deref()).unwrap_or(DEFAULT_MEMBER_NICKNAME);

    let outcome = HouseholdService::new(state.pool())
        .join(user.id, code, nickname, RejoinPolicy::UpdateNickname)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(JoinResponse {
            household_id: outcome.household.id,
            household_name: outcome.household.name,
            member_id: outcome.member.id,
            user: user.username,
            nickname: outcome.member.nickname,
        }),
    ))
}
