//! Request metrics middleware.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::metrics::UNMATCHED_ENDPOINT;
use crate::state::AppState;

/// Count and time every request, labelled by its matched route.
pub async fn track_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().as_str().to_owned();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ENDPOINT, MatchedPath::as_str)
        .to_owned();

    let start = Instant::now();
    let response = next.run(request).await;

    state
        .metrics()
        .observe(&method, &endpoint, response.status().as_u16(), start.elapsed());

    response
}
