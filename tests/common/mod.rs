//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use tokio::net::TcpListener;

use api_gateway::config::{GatewayConfig, RouteConfig};
use api_gateway::{GatewayServer, Shutdown};

/// Serve `app` on an ephemeral port.
pub async fn start_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that describes every request it receives.
///
/// Body: "<METHOD> <path?query>". Headers: `x-backend` plus `x-seen-*` copies
/// of what arrived, and `x-body-len` with the received body size.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move |request: Request<Body>| echo(name, request));
    start_backend(app).await
}

async fn echo(name: &'static str, request: Request<Body>) -> Response<Body> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let seen = |header: &str| {
        parts
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    Response::builder()
        .header("x-backend", name)
        .header("x-seen-host", seen("host"))
        .header("x-seen-forwarded-for", seen("x-forwarded-for"))
        .header("x-seen-forwarded-host", seen("x-forwarded-host"))
        .header("x-seen-request-id", seen("x-request-id"))
        .header("x-body-len", bytes.len().to_string())
        .body(Body::from(format!("{} {}", parts.method, path_and_query)))
        .unwrap()
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn route(name: &str, prefix: &str, backend: SocketAddr, strip_prefix: bool) -> RouteConfig {
    RouteConfig::new(name, prefix, format!("http://{}", backend), strip_prefix)
}

/// A gateway running in the background; shut down on drop.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(routes: Vec<RouteConfig>) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.routes = routes;
    start_gateway_with(config).await
}

pub async fn start_gateway_with(config: GatewayConfig) -> TestGateway {
    let server = GatewayServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
