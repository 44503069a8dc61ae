//! Entry forms on the pet page: add, edit and delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use petcare_core::{EntryId, PetId};

use super::pets::pet_page;
use super::{PagePath, PageResult, non_blank};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, EntryRange, Pet};
use crate::services::{EntryService, PetService};
use crate::state::AppState;

/// Entry form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EntryForm {
    pub content: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "entries/edit.html")]
pub struct EditTemplate {
    pub user: Option<CurrentUser>,
    pub pet: Pet,
    pub entry_id: EntryId,
    pub error: Option<String>,
    pub content: String,
}

fn pet_redirect(pet_id: PetId) -> Redirect {
    Redirect::to(&format!("/pets/{pet_id}"))
}

/// Add an entry. Blank text re-renders the pet page with an error.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath(pet_id): PagePath<PetId>,
    Form(form): Form<EntryForm>,
) -> PageResult<Response> {
    let pet = PetService::new(state.pool()).get(user.id, pet_id).await?;

    let Some(content) = non_blank(&form.content) else {
        let page = pet_page(
            &state,
            user,
            pet_id,
            EntryRange::Today,
            Some("Entry text is required.".to_string()),
            String::new(),
        )
        .await?;
        return Ok(page.into_response());
    };

    EntryService::new(state.pool())
        .create(user.id, &pet, content)
        .await?;

    Ok(pet_redirect(pet_id).into_response())
}

/// Display the edit form. Author only.
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath((pet_id, entry_id)): PagePath<(PetId, EntryId)>,
) -> PageResult<impl IntoResponse> {
    let entries = EntryService::new(state.pool());
    let entry = entries.get_in_pet(pet_id, entry_id).await?;
    EntryService::ensure_author(user.id, &entry)?;
    let pet = entries.require_pet(pet_id).await?;

    Ok(EditTemplate {
        user: Some(user),
        pet,
        entry_id,
        error: None,
        content: entry.content,
    })
}

/// Save an edited entry. Author only.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath((pet_id, entry_id)): PagePath<(PetId, EntryId)>,
    Form(form): Form<EntryForm>,
) -> PageResult<Response> {
    let entries = EntryService::new(state.pool());
    let entry = entries.get_in_pet(pet_id, entry_id).await?;
    EntryService::ensure_author(user.id, &entry)?;

    let Some(content) = non_blank(&form.content) else {
        let pet = entries.require_pet(pet_id).await?;
        return Ok(EditTemplate {
            user: Some(user),
            pet,
            entry_id,
            error: Some("Content cannot be empty.".to_string()),
            content: entry.content,
        }
        .into_response());
    };

    entries.update(user.id, &entry, content).await?;
    Ok(pet_redirect(pet_id).into_response())
}

/// Delete an entry. Author only.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PagePath((pet_id, entry_id)): PagePath<(PetId, EntryId)>,
) -> PageResult<Redirect> {
    let entries = EntryService::new(state.pool());
    let entry = entries.get_in_pet(pet_id, entry_id).await?;
    entries.delete(user.id, &entry).await?;

    Ok(pet_redirect(pet_id))
}
