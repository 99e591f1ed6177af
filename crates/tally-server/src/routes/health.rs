//! Liveness and metrics endpoints. Neither requires authentication.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Content type of the Prometheus text exposition format.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics()
        .render(state.counter())
        .map_err(|e| ApiError::Internal(format!("failed to encode metrics: {e}")))?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, METRICS_CONTENT_TYPE)], body).into_response())
}
