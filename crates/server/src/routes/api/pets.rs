//! Pets API. Every operation requires membership of the pet's household.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use petcare_core::{HouseholdId, PetId};

use super::{ApiPath, JsonBody, non_blank, present};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Pet;
use crate::services::{HouseholdService, PetService};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreatePetRequest {
    pub name: Option<String>,
}

/// Partial update. An absent `name` leaves the pet unchanged; a present but
/// blank or null one is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePetRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct PetResponse {
    pub id: PetId,
    pub household_id: HouseholdId,
    pub name: String,
}

impl From<Pet> for PetResponse {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            household_id: pet.household_id,
            name: pet.name,
        }
    }
}

/// List a household's pets ordered by name.
///
/// GET /api/v1/households/{id}/pets
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(household_id): ApiPath<HouseholdId>,
) -> Result<Json<Vec<PetResponse>>> {
    let pets = PetService::new(state.pool())
        .list(user.id, household_id)
        .await?;

    Ok(Json(pets.into_iter().map(Into::into).collect()))
}

/// Add a pet to a household.
///
/// POST /api/v1/households/{id}/pets
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(household_id): ApiPath<HouseholdId>,
    JsonBody(body): JsonBody<CreatePetRequest>,
) -> Result<impl IntoResponse> {
    HouseholdService::new(state.pool())
        .require_member(user.id, household_id)
        .await?;

    let name = non_blank(body.name.as_deref())
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?;
    let pet = PetService::new(state.pool())
        .create(user.id, household_id, name)
        .await?;

    let location = format!("/api/v1/pets/{}", pet.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PetResponse::from(pet)),
    ))
}

/// Show a pet.
///
/// GET /api/v1/pets/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<PetId>,
) -> Result<Json<PetResponse>> {
    let pet = PetService::new(state.pool()).get(user.id, id).await?;
    Ok(Json(pet.into()))
}

/// Rename a pet.
///
/// PATCH /api/v1/pets/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<PetId>,
    JsonBody(body): JsonBody<UpdatePetRequest>,
) -> Result<Json<PetResponse>> {
    let pets = PetService::new(state.pool());
    let pet = pets.get(user.id, id).await?;

    let Some(name) = body.name else {
        return Ok(Json(pet.into()));
    };
    let name = non_blank(name.as_deref())
        .ok_or_else(|| AppError::BadRequest("name cannot be empty".to_string()))?;

    let pet = pets.rename(user.id, id, name).await?;
    Ok(Json(pet.into()))
}

/// Delete a pet and its entries.
///
/// DELETE /api/v1/pets/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<PetId>,
) -> Result<StatusCode> {
    PetService::new(state.pool()).delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
