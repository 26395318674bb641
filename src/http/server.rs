//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Dispatch requests: matched route → forwarder, otherwise → fallback
//!
//! # Design Decisions
//! - Every request is handled on its own task; nothing mutable is shared
//! - Per-request errors end in an error response, never in a server error
//! - Graceful shutdown drains in-flight requests

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigError, GatewayConfig};
use crate::http::fallback;
use crate::http::forward::Forwarder;
use crate::http::request::{request_id, MakeGatewayRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub forwarder: Forwarder,
}

/// HTTP server for the API gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server, compiling the route table from `config`.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let registry = Registry::from_config(&config.routes).map_err(ConfigError::Validation)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server around an already built registry.
    pub fn with_registry(config: GatewayConfig, registry: Registry) -> Self {
        tracing::info!(routes = registry.routes().len(), "Route table compiled");
        for route in registry.routes() {
            tracing::debug!(
                route = %route.name(),
                prefix = %route.prefix(),
                backend = %route.backend(),
                strip_prefix = route.strip_prefix(),
                "Route registered"
            );
        }

        let state = AppState {
            registry: Arc::new(registry),
            forwarder: Forwarder::new(&config.timeouts),
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeGatewayRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id(request),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Consume the server, returning its router (used by in-process tests).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler.
/// Looks up the route and forwards, or serves the fallback.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(matched) = state.registry.match_path(&path) else {
        tracing::debug!(path = %path, "No route matched, serving fallback");
        let response = fallback::handle(&request);
        metrics::record_request(method.as_str(), response.status().as_u16(), "fallback", start_time);
        return response;
    };
    let route = matched.route;

    tracing::debug!(
        route = %route.name(),
        backend = %route.backend(),
        upstream_path = %matched.remaining_path,
        "Forwarding request"
    );

    let response = match state
        .forwarder
        .forward(route, request, &matched.remaining_path, client_addr)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                route = %route.name(),
                backend = %route.backend(),
                status = e.status().as_u16(),
                error = %e,
                "Backend request failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), route.name(), start_time);
    response
}
