//! # tally-server: RBAC-gated counter over HTTP
//!
//! Serves a single shared counter. Every counter request is resolved to an
//! identity from its bearer token and checked against the role registry
//! before the counter is touched.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        tally-server                         │
//! │  ┌───────────┐   ┌────────────────┐   ┌─────────────────┐  │
//! │  │  Router   │ → │ CallerIdentity │ → │  AccessEnforcer │  │
//! │  │  (axum)   │   │ (bearer token) │   │  (tally-rbac)   │  │
//! │  └───────────┘   └────────────────┘   └────────┬────────┘  │
//! │                                                ↓           │
//! │                                      ┌─────────────────┐   │
//! │                                      │ Counter (CAS)   │   │
//! │                                      └─────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Endpoints
//!
//! | Method | Path       | Permission  | Success                          |
//! |--------|------------|-------------|----------------------------------|
//! | GET    | `/`        | `read`      | 200 `{"counter": n}`             |
//! | POST   | `/`        | `increment` | 201 `{"message": .., "counter"}` |
//! | GET    | `/health`  | none        | 200 `{"status": "healthy"}`      |
//! | GET    | `/metrics` | none        | 200 Prometheus text              |
//!
//! ## Usage
//!
//! ```ignore
//! use tally_config::TallyConfig;
//! use tally_server::Server;
//!
//! let config = TallyConfig::load()?;
//! let server = Server::new(&config)?;
//! server.run().await?;
//! ```

pub mod auth;
mod error;
pub mod metrics;
pub mod routes;
mod server;
mod state;

pub use auth::{CallerIdentity, UserDirectory, bearer_token};
pub use error::{ApiError, ErrorResponse, ServerError, ServerResult};
pub use metrics::{IncrementOutcome, Metrics};
pub use server::{Server, app};
pub use state::AppState;
