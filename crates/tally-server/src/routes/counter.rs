//! Counter endpoints.
//!
//! - `GET /` reads the counter (requires `read`)
//! - `POST /` increments it (requires `increment`)

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tally_counter::{CounterError, Delta};
use tally_rbac::Permission;
use tracing::instrument;

use crate::auth::CallerIdentity;
use crate::error::ApiError;
use crate::metrics::IncrementOutcome;
use crate::state::AppState;

/// Name of the optional JSON field carrying the delta.
pub const INCREMENT_FIELD: &str = "increment";

/// Response from a read.
#[derive(Debug, Serialize)]
pub struct CounterResponse {
    pub counter: i64,
}

/// Response from a successful increment.
#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub message: &'static str,
    pub counter: i64,
}

/// Returns the current counter value.
///
/// GET /
#[instrument(skip_all, fields(op = "read"))]
pub async fn read_counter(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<Response, ApiError> {
    state.require(identity.as_ref(), &Permission::READ)?;

    let counter = state.counter().read();
    Ok((StatusCode::OK, Json(CounterResponse { counter })).into_response())
}

/// Adds the requested delta (default 1) to the counter.
///
/// POST /
///
/// Authorization is checked before the body is looked at, so a caller
/// without `increment` gets 403 whatever they sent.
#[instrument(skip_all, fields(op = "increment"))]
pub async fn increment_counter(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    body: Bytes,
) -> Result<Response, ApiError> {
    state.require(identity.as_ref(), &Permission::INCREMENT)?;

    let result = parse_increment(&body).and_then(|delta| state.counter().increment(delta.get()));

    match result {
        Ok(counter) => {
            state
                .metrics()
                .record_increment(IncrementOutcome::Committed);
            tracing::info!(
                user_id = %identity.as_ref().map_or("<none>", |i| i.user_id.as_str()),
                counter,
                "Counter incremented"
            );
            Ok((
                StatusCode::CREATED,
                Json(IncrementResponse {
                    message: "Counter incremented successfully.",
                    counter,
                }),
            )
                .into_response())
        }
        Err(err) => {
            let outcome = if err.is_overflow() {
                IncrementOutcome::Overflow
            } else {
                IncrementOutcome::InvalidDelta
            };
            state.metrics().record_increment(outcome);
            tracing::debug!(error = %err, "Increment rejected");
            Err(err.into())
        }
    }
}

/// Parses a POST body into a delta.
///
/// - empty (or whitespace-only) body: default delta
/// - JSON object without the field: default delta
/// - JSON object with the field: [`Delta::parse`]
/// - anything else: `InvalidDelta`
pub fn parse_increment(body: &[u8]) -> Result<Delta, CounterError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Delta::DEFAULT);
    }

    let payload: Value =
        serde_json::from_slice(body).map_err(|e| CounterError::InvalidDelta {
            reason: format!("request body is not valid JSON: {e}"),
        })?;

    match payload {
        Value::Object(fields) => Delta::parse(fields.get(INCREMENT_FIELD)),
        _ => Err(CounterError::InvalidDelta {
            reason: "request body must be a JSON object".to_string(),
        }),
    }
}
