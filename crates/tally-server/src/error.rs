//! Server error types.
//!
//! [`ServerError`] covers startup and lifecycle failures. [`ApiError`] is what
//! a request handler returns; it knows how to become an HTTP response and
//! never leaks internal detail into the body.

use std::net::SocketAddr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tally_config::ConfigError;
use tally_counter::CounterError;
use tally_rbac::{Permission, RegistryError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Bind failed.
    #[error("failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The role mapping is malformed.
    #[error("invalid role configuration: {0}")]
    Registry(#[from] RegistryError),

    /// The configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Metrics registration or encoding failed.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A request that could not be served.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No credentials, or credentials that match no user.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but no role grants the permission.
    #[error("missing permission '{permission}'")]
    Forbidden { permission: Permission },

    /// The increment payload was malformed.
    #[error("invalid increment: {0}")]
    InvalidDelta(String),

    /// The increment would overflow the counter.
    #[error("counter overflow")]
    Overflow,

    /// Anything else. The message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidDelta(_) => StatusCode::BAD_REQUEST,
            ApiError::Overflow => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        let (error, details) = match self {
            ApiError::Unauthenticated => ("Authentication required.".to_string(), None),
            ApiError::Forbidden { permission } => {
                (format!("Unauthorized to {permission} counter."), None)
            }
            ApiError::InvalidDelta(reason) => (
                "Invalid increment value (must be an integer).".to_string(),
                Some(reason.clone()),
            ),
            ApiError::Overflow => ("Counter overflow; increment rejected.".to_string(), None),
            ApiError::Internal(_) => ("An internal error occurred.".to_string(), None),
        };
        ErrorResponse { error, details }
    }
}

impl From<CounterError> for ApiError {
    fn from(err: CounterError) -> Self {
        match err {
            CounterError::InvalidDelta { reason } => ApiError::InvalidDelta(reason),
            CounterError::Overflow { .. } => ApiError::Overflow,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            if !detail.is_empty() {
                tracing::error!(error = %detail, "request failed with internal error");
            }
        }
        (self.status(), Json(self.body())).into_response()
    }
}
