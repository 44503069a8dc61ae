//! Pet pages: add, delete, and the pet detail page with its entry log.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use petcare_core::{EntryId, HouseholdId, PetId, UserId};

use super::{PagePath, PageResult, format_local, non_blank};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, EntryRange, Household, Pet};
use crate::services::{EntryService, HouseholdService, PetService};
use crate::state::AppState;

/// Range tabs shown on the pet page, as `(query value, label)`.
pub const RANGES: [(&str, &str); 4] = [
    ("today", "Today"),
    ("week", "This week"),
    ("month", "This month"),
    ("all", "All"),
];

// =============================================================================
// Form / Query Types
// =============================================================================

/// New pet form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPetForm {
    pub name: String,
}

/// Pet page query string.
#[derive(Debug, Default, Deserialize)]
pub struct PetQuery {
    pub range: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "pets/new.html")]
pub struct NewTemplate {
    pub user: Option<CurrentUser>,
    pub household: Household,
    pub error: Option<String>,
    pub name: String,
}

/// One entry as shown on the pet page.
pub struct EntryView {
    pub id: EntryId,
    pub content: String,
    /// Household nickname of the author, or the username if they left.
    pub author: String,
    pub created_at: String,
    pub is_mine: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "pets/show.html")]
pub struct ShowTemplate {
    pub user: Option<CurrentUser>,
    pub household: Household,
    pub pet: Pet,
    pub ranges: [(&'static str, &'static str); 4],
    pub range: &'static str,
    pub error: Option<String>,
    pub content: String,
    pub entries: Vec<EntryView>,
}

/// Build the pet page for a household member.
///
/// Shared with the entry form, which re-renders this page on a validation error.
pub(super) async fn pet_page(
    state: &AppState,
    user: CurrentUser,
    pet_id: PetId,
    range: EntryRange,
    error: Option<String>,
    content: String,
) -> PageResult<ShowTemplate> {
    let pet = PetService::new(state.pool()).get(user.id, pet_id).await?;
    let households = HouseholdService::new(state.pool());
    let household = households.get(user.id, pet.household_id).await?;

    let nicknames: HashMap<UserId, String> = households
        .members(user.id, household.id)
        .await?
        .into_iter()
        .map(|m| (m.user_id, m.nickname))
        .collect();

    let since = range.start(Utc::now());
    let entries = EntryService::new(state.pool()).list(pet_id, since).await?;

    let tz = state.config().display_tz;
    let mut authors: HashMap<UserId, String> = HashMap::new();
    let mut views = Vec::with_capacity(entries.len());
    for entry in entries {
        let author = match nicknames.get(&entry.user_id) {
            Some(nickname) => nickname.clone(),
            None => match authors.get(&entry.user_id) {
                Some(name) => name.clone(),
                None => {
                    let name = author_name(state, entry.user_id).await;
                    authors.insert(entry.user_id, name.clone());
                    name
                }
            },
        };
        views.push(EntryView {
            id: entry.id,
            is_mine: entry.user_id == user.id,
            created_at: format_local(entry.created_at, tz),
            content: entry.content,
            author,
        });
    }

    Ok(ShowTemplate {
        user: Some(user),
        household,
        pet,
        ranges: RANGES,
        range: range.as_str(),
        error,
        content,
        entries: views,
    })
}

/// Username of an author who is no longer in the household.
async fn author_name(state: &AppState, user_id: UserId) -> String {
    crate::services::AuthService::new(state.pool())
        .get_user(user_id)
        .await
        .map_or_else(|_| "unknown".to_string(), |u| u.username.into_inner())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the new pet form.
pub async fn new_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath(household_id): PagePath<HouseholdId>,
) -> PageResult<impl IntoResponse> {
    let household = HouseholdService::new(state.pool())
        .get(user.id, household_id)
        .await?;

    Ok(NewTemplate {
        user: Some(user),
        household,
        error: None,
        name: String::new(),
    })
}

/// Add a pet and return to the household dashboard.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath(household_id): PagePath<HouseholdId>,
    Form(form): Form<NewPetForm>,
) -> PageResult<Response> {
    let household = HouseholdService::new(state.pool())
        .get(user.id, household_id)
        .await?;

    let Some(name) = non_blank(&form.name) else {
        return Ok(NewTemplate {
            user: Some(user),
            household,
            error: Some("Pet name is required.".to_string()),
            name: form.name.clone(),
        }
        .into_response());
    };

    PetService::new(state.pool())
        .create(user.id, household_id, name)
        .await?;

    Ok(Redirect::to(&format!("/households/{household_id}")).into_response())
}

/// Delete a pet that belongs to the household in the path.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath((household_id, pet_id)): PagePath<(HouseholdId, PetId)>,
) -> PageResult<Redirect> {
    PetService::new(state.pool())
        .delete_in_household(user.id, household_id, pet_id)
        .await?;

    Ok(Redirect::to(&format!("/households/{household_id}")))
}

/// Pet page with entries filtered by `?range=`.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath(pet_id): PagePath<PetId>,
    Query(query): Query<PetQuery>,
) -> PageResult<ShowTemplate> {
    let range = EntryRange::parse(query.range.as_deref());
    pet_page(&state, user, pet_id, range, None, String::new()).await
}
