//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Health & metrics
//! GET  /health, /api/health            - JSON liveness check
//! GET  /healthz                        - Plain-text liveness check
//! GET  /health/ready                   - Database readiness check
//! GET  /metrics                        - Prometheus metrics
//!
//! # HTML pages (see `ui`)
//! GET  /                               - Redirect to households or login
//! GET  /login, /signup                 - Auth forms (POST to submit)
//! GET  /logout                         - Clear session
//! GET  /households                     - Membership list
//! GET  /households/new                 - New household form (POST to create)
//! GET  /households/{id}                - Dashboard
//! POST /households/{id}/leave          - Leave household
//! POST /households/{id}/nickname       - Change nickname
//! GET  /join                           - Join form (POST to join)
//! GET  /households/{id}/pets/new       - New pet form (POST to create)
//! POST /households/{id}/pets/{pet_id}/delete
//! GET  /pets/{id}?range=               - Pet page with entry log
//! POST /pets/{id}/entries/new
//! GET  /pets/{id}/entries/{entry_id}/edit (POST to save)
//! POST /pets/{id}/entries/{entry_id}/delete
//! GET  /profile                        - Profile (POST /profile/username)
//!
//! # JSON API (see `api`)
//! /api/v1/auth/{signup,login,logout}
//! /api/v1/users/me
//! /api/v1/households[/{id}[/members|/leave|/pets]], /api/v1/households/join
//! /api/v1/pets/{id}[/entries]
//! /api/v1/entries/{id}
//! ```

pub mod api;
pub mod health;
pub mod ui;

use axum::{Router, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/health", get(health::health))
        .route("/healthz", get(health::healthz))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
        .merge(ui::routes())
        .nest("/api/v1", api::routes())
}

/// Fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}

/// Fallback for known paths hit with the wrong method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
