//! Health, readiness and metrics endpoints.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// JSON liveness check.
///
/// GET /health, GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Plain-text liveness check for load balancers.
///
/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// Readiness check.
///
/// Verifies database connectivity. Returns 503 Service Unavailable if the
/// database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Prometheus scrape endpoint.
///
/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state
        .metrics()
        .render()
        .map_err(|e| AppError::Internal(format!("metrics encoding failed: {e}")))?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
