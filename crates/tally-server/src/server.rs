//! Router assembly and the server lifecycle.

use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tally_config::TallyConfig;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::{ErrorResponse, ServerError, ServerResult};
use crate::routes;
use crate::state::AppState;

/// Builds the application router over `state`.
///
/// Methods other than GET and POST on `/` answer 405.
pub fn app(state: AppState) -> Router {
    with_middleware(
        Router::new()
            .route(
                "/",
                get(routes::counter::read_counter).post(routes::counter::increment_counter),
            )
            .route("/health", get(routes::health::health))
            .route("/metrics", get(routes::health::metrics)),
    )
    .with_state(state)
}

/// Wraps `routes` in the request tracing and panic-catching layers.
fn with_middleware(routes: Router<AppState>) -> Router<AppState> {
    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "An internal error occurred.".to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// The counter service.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
    state: AppState,
}

impl Server {
    /// Creates a server from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate (bind address, user ids
    /// and tokens) or the role mapping is malformed.
    pub fn new(config: &TallyConfig) -> ServerResult<Self> {
        let addr = config.bind_addr()?;
        let state = AppState::from_config(config)?;

        if config.users.is_empty() {
            warn!("no users configured; every counter request will be rejected with 401");
        }

        Ok(Self::with_state(addr, state))
    }

    /// Creates a server over prepared state.
    pub fn with_state(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    /// Returns the configured bind address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns the router, for serving on a custom listener or in tests.
    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    /// Binds the configured address and serves until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the listener errors.
    pub async fn run(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::BindFailed {
                addr: self.addr,
                source,
            })?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on `listener` until `shutdown` resolves.
    ///
    /// In-flight requests are allowed to finish after `shutdown` fires.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr()?;
        info!(address = %local, "counter service listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!(
            counter = self.state.counter().read(),
            "counter service stopped"
        );
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            // Without a signal handler the server would never stop cleanly;
            // keep serving until the process is killed.
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_new_uses_configured_address() {
        let mut config = TallyConfig::default();
        config.server.bind_address = "127.0.0.1:8081".to_string();

        let server = Server::new(&config).unwrap();
        assert_eq!(server.addr(), "127.0.0.1:8081".parse().unwrap());
        assert_eq!(server.state().counter().read(), 0);
    }

    #[test]
    fn test_new_rejects_bad_address() {
        let mut config = TallyConfig::default();
        config.server.bind_address = "not-an-address".to_string();

        assert!(matches!(Server::new(&config), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_new_rejects_shared_tokens() {
        let user = |id: &str| tally_config::UserDefinition {
            id: id.to_string(),
            name: None,
            token: "same".to_string(),
            roles: vec!["admin".to_string()],
        };
        let config = TallyConfig {
            users: vec![user("1"), user("2")],
            ..Default::default()
        };

        assert!(matches!(Server::new(&config), Err(ServerError::Config(_))));
    }

    async fn boom() -> &'static str {
        panic!("secret detail")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_opaque_500() {
        let state = AppState::from_config(&TallyConfig::default()).unwrap();
        let router = with_middleware(Router::new().route("/boom", get(boom))).with_state(state);

        let response = router
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "An internal error occurred."}));
    }

    #[test]
    fn test_panic_handler_is_opaque() {
        let response = handle_panic(Box::new("secret detail".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
