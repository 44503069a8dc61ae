//! Server-rendered HTML pages.
//!
//! Every page except login and signup requires a session; [`RequireAuth`]
//! redirects anonymous visitors to `/login`. Successful form posts redirect
//! with 303 See Other.
//!
//! [`RequireAuth`]: crate::middleware::RequireAuth

pub mod auth;
pub mod entries;
pub mod home;
pub mod households;
pub mod pets;
pub mod profile;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{FromRequestParts, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::filters;
use crate::models::CurrentUser;
use crate::services::{AuthError, ServiceError};
use crate::state::AppState;

/// Timestamp format used on HTML pages.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render a UTC timestamp as wall-clock time in the display zone.
#[must_use]
pub fn format_local(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format(DISPLAY_FORMAT).to_string()
}

/// Trim a form value, treating blank as absent.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|s| !s.is_empty())
}

// =============================================================================
// Error pages
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "errors/403.html")]
pub struct ForbiddenTemplate {
    pub user: Option<CurrentUser>,
}

#[derive(Template, WebTemplate)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub user: Option<CurrentUser>,
}

#[derive(Template, WebTemplate)]
#[template(path = "errors/500.html")]
pub struct ServerErrorTemplate {
    pub user: Option<CurrentUser>,
}

/// Error rendered as an HTML error page.
#[derive(Debug)]
pub enum PageError {
    NotFound,
    Forbidden,
    Internal(String),
}

impl From<ServiceError> for PageError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => Self::NotFound,
            ServiceError::Forbidden => Self::Forbidden,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for PageError {
    fn from(err: AuthError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for PageError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<PathRejection> for PageError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => {
                (StatusCode::NOT_FOUND, NotFoundTemplate { user: None }).into_response()
            }
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, ForbiddenTemplate { user: None }).into_response()
            }
            Self::Internal(message) => {
                let event_id = sentry::capture_message(&message, sentry::Level::Error);
                tracing::error!(error = %message, sentry_event_id = %event_id, "Page error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ServerErrorTemplate { user: None },
                )
                    .into_response()
            }
        }
    }
}

/// Result type for page handlers.
pub type PageResult<T> = Result<T, PageError>;

/// Path parameters; an unparseable segment renders the 404 page.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PageError))]
pub struct PagePath<T>(pub T);

// =============================================================================
// Router
// =============================================================================

/// Create the HTML routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", get(auth::logout))
        // Households
        .route("/households", get(households::index))
        .route(
            "/households/new",
            get(households::new_page).post(households::create),
        )
        .route("/households/{id}", get(households::show))
        .route("/households/{id}/leave", post(households::leave))
        .route("/join", get(households::join_page).post(households::join))
        // Pets
        .route(
            "/households/{id}/pets/new",
            get(pets::new_page).post(pets::create),
        )
        .route(
            "/households/{id}/pets/{pet_id}/delete",
            post(pets::delete),
        )
        .route("/pets/{id}", get(pets::show))
        // Entries
        .route("/pets/{id}/entries/new", post(entries::create))
        .route(
            "/pets/{id}/entries/{entry_id}/edit",
            get(entries::edit_page).post(entries::update),
        )
        .route(
            "/pets/{id}/entries/{entry_id}/delete",
            post(entries::delete),
        )
        // Profile
        .route("/profile", get(profile::show))
        .route("/profile/username", post(profile::update_username))
        .route(
            "/households/{id}/nickname",
            post(profile::update_nickname),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_local_winter_time() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 23, 30, 0).unwrap();

        assert_eq!(format_local(at, chrono_tz::Europe::Madrid), "2025-01-16 00:30");
    }

    #[test]
    fn test_format_local_summer_time() {
        let at = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();

        assert_eq!(format_local(at, chrono_tz::Europe::Madrid), "2025-07-01 14:00");
        assert_eq!(format_local(at, chrono_tz::UTC), "2025-07-01 12:00");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  Rex  "), Some("Rex"));
        assert_eq!(non_blank(" \t "), None);
    }

    #[test]
    fn test_page_error_status() {
        assert_eq!(
            PageError::from(ServiceError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PageError::from(ServiceError::Forbidden).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            PageError::from(ServiceError::JoinCodeExhausted)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
