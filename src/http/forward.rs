//! Request forwarding to backends.
//!
//! # Responsibilities
//! - Build the outbound request (target URI, rewritten path, headers)
//! - Send it over the pooled HTTP client with a response deadline
//! - Relay the backend response as a stream
//! - Map transport failures to 502/504
//!
//! # Design Decisions
//! - Bodies are streamed in both directions, never buffered
//! - No retries; a failed backend call is visible to the caller
//! - Error responses never echo backend or transport details

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::HOST, uri::PathAndQuery, Request, Response, StatusCode, Uri, Version},
    response::IntoResponse,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;
use crate::http::headers;
use crate::routing::Route;

/// Per-request forwarding failure.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("backend connection failed: {0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    #[error("backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend exchange failed: {0}")]
    Upstream(#[source] hyper_util::client::legacy::Error),

    #[error("could not build backend URI: {0}")]
    InvalidUri(String),
}

impl ForwardError {
    /// Status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = status.canonical_reason().unwrap_or("Gateway Error");
        (status, body).into_response()
    }
}

/// Relays requests to backends over a shared connection pool.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let connect_timeout = Duration::from_secs(timeouts.connect_secs);
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.pool_idle_secs))
            .build(connector);

        Self {
            client,
            connect_timeout,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Forward `request` to the route's backend with `remaining_path` as its path.
    pub async fn forward(
        &self,
        route: &Route,
        request: Request<Body>,
        remaining_path: &str,
        client_addr: SocketAddr,
    ) -> Result<Response<Body>, ForwardError> {
        let upstream = build_upstream_request(route, request, remaining_path, client_addr)?;

        let response = match tokio::time::timeout(self.request_timeout, self.client.request(upstream)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if is_timeout(&e) => return Err(ForwardError::Timeout(self.connect_timeout)),
            Ok(Err(e)) if e.is_connect() => return Err(ForwardError::Connect(e)),
            Ok(Err(e)) => return Err(ForwardError::Upstream(e)),
            Err(_) => return Err(ForwardError::Timeout(self.request_timeout)),
        };

        Ok(relay_response(response))
    }
}

/// Derive the outbound request from the inbound one.
///
/// The body is moved, not copied, so it keeps streaming.
pub fn build_upstream_request(
    route: &Route,
    request: Request<Body>,
    remaining_path: &str,
    client_addr: SocketAddr,
) -> Result<Request<Body>, ForwardError> {
    let (parts, body) = request.into_parts();
    let backend = route.backend();

    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{}", remaining_path, query),
        None => remaining_path.to_string(),
    };
    let path_and_query = PathAndQuery::try_from(path_and_query.as_str())
        .map_err(|e| ForwardError::InvalidUri(e.to_string()))?;

    let uri = Uri::builder()
        .scheme(backend.scheme().clone())
        .authority(backend.authority().clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| ForwardError::InvalidUri(e.to_string()))?;

    // HTTP/2 callers carry the host in the URI authority instead of a header.
    let original_host = parts.headers.get(HOST).cloned().or_else(|| {
        parts
            .uri
            .authority()
            .and_then(|a| a.as_str().parse().ok())
    });

    let mut headers = parts.headers;
    headers::prepare_upstream_headers(&mut headers, backend, client_addr.ip(), original_host);

    let mut upstream = Request::new(body);
    *upstream.method_mut() = parts.method;
    *upstream.uri_mut() = uri;
    *upstream.version_mut() = Version::HTTP_11;
    *upstream.headers_mut() = headers;

    Ok(upstream)
}

/// Turn the backend response into the caller response, body still streaming.
fn relay_response(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    headers::strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

fn is_timeout(err: &hyper_util::client::legacy::Error) -> bool {
    let mut source = err.source();
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = e.source();
    }
    false
}
