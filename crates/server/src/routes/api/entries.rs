//! Entries API.
//!
//! Any logged-in user may add or read a pet's entries; only the author may
//! edit or delete one.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use petcare_core::{EntryId, PetId, UserId};

use super::{ApiPath, JsonBody, non_blank};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Entry;
use crate::services::EntryService;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EntryRequest {
    pub content: Option<String>,
}

impl EntryRequest {
    fn content(&self) -> Result<&str> {
        non_blank(self.content.as_deref())
            .ok_or_else(|| AppError::BadRequest("content is required".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: EntryId,
    pub pet_id: PetId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            pet_id: entry.pet_id,
            user_id: entry.user_id,
            content: entry.content,
            created_at: entry.created_at,
        }
    }
}

/// List a pet's entries, newest first.
///
/// GET /api/v1/pets/{id}/entries
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(pet_id): ApiPath<PetId>,
) -> Result<Json<Vec<EntryResponse>>> {
    let entries = EntryService::new(state.pool()).list(pet_id, None).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Add an entry to a pet.
///
/// POST /api/v1/pets/{id}/entries
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(pet_id): ApiPath<PetId>,
    JsonBody(body): JsonBody<EntryRequest>,
) -> Result<impl IntoResponse> {
    let entries = EntryService::new(state.pool());
    let pet = entries.require_pet(pet_id).await?;

    let entry = entries.create(user.id, &pet, body.content()?).await?;

    let location = format!("/api/v1/entries/{}", entry.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(EntryResponse::from(entry)),
    ))
}

/// Show an entry.
///
/// GET /api/v1/entries/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<EntryId>,
) -> Result<Json<EntryResponse>> {
    let entry = EntryService::new(state.pool()).get(id).await?;
    Ok(Json(entry.into()))
}

/// Replace an entry's content.
///
/// PATCH /api/v1/entries/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<EntryId>,
    JsonBody(body): JsonBody<EntryRequest>,
) -> Result<Json<EntryResponse>> {
    let entries = EntryService::new(state.pool());
    let entry = entries.get(id).await?;
    EntryService::ensure_author(user.id, &entry)?;

    let entry = entries.update(user.id, &entry, body.content()?).await?;
    Ok(Json(entry.into()))
}

/// Delete an entry.
///
/// DELETE /api/v1/entries/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<EntryId>,
) -> Result<StatusCode> {
    let entries = EntryService::new(state.pool());
    let entry = entries.get(id).await?;
    entries.delete(user.id, &entry).await?;
    Ok(StatusCode::NO_CONTENT)
}
