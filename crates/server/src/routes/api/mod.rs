//! JSON API under `/api/v1`.
//!
//! All endpoints except signup and login require a session. Errors are
//! returned as `{"error": "..."}` via [`AppError`].

pub mod auth;
pub mod entries;
pub mod households;
pub mod pets;
pub mod users;

use axum::{
    Router,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request, rejection::PathRejection},
    routing::{get, post},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::error::AppError;
use crate::state::AppState;

// =============================================================================
// Extractors
// =============================================================================

/// JSON request body that never fails to parse.
///
/// A missing, malformed or non-object body becomes `T::default()`, so it
/// fails field validation with a 400 naming the missing field instead of a
/// generic parse error.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Ok(Self(serde_json::from_slice(&bytes).unwrap_or_default()))
    }
}

/// Path parameters; a segment that doesn't parse (e.g. a non-numeric id) is a 404.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound("not found".to_string())
    }
}

/// Deserialize a field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "present")]` on an
/// `Option<Option<T>>`: absent is `None`, `null` is `Some(None)`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim an optional string, treating blank as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Router
// =============================================================================

/// Create the `/api/v1` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Current user
        .route("/users/me", get(users::me).patch(users::update_me))
        // Households
        .route(
            "/households",
            get(households::index).post(households::create),
        )
        .route("/households/join", post(households::join))
        .route(
            "/households/{id}",
            get(households::show)
                .patch(households::update)
                .delete(households::destroy),
        )
        .route("/households/{id}/members", get(households::members))
        .route("/households/{id}/leave", post(households::leave))
        // Pets
        .route(
            "/households/{id}/pets",
            get(pets::index).post(pets::create),
        )
        .route(
            "/pets/{id}",
            get(pets::show).patch(pets::update).delete(pets::destroy),
        )
        // Entries
        .route(
            "/pets/{id}/entries",
            get(entries::index).post(entries::create),
        )
        .route(
            "/entries/{id}",
            get(entries::show)
                .patch(entries::update)
                .delete(entries::destroy),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "present")]
        name: Option<Option<String>>,
    }

    #[test]
    fn test_present_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.name, None);

        let null: Patch = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(null.name, Some(None));

        let value: Patch = serde_json::from_str(r#"{"name": "Rex"}"#).unwrap();
        assert_eq!(value.name, Some(Some("Rex".to_string())));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Rex ")), Some("Rex"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
