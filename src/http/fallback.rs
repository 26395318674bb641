//! Default response for paths no route claims.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};

/// Body of the gateway's own welcome response.
pub const GREETING: &str = "Hi, this is the API gateway!";

/// Serve the fixed greeting. Never inspects backends and never fails.
pub fn handle(_request: &Request<Body>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        GREETING,
    )
        .into_response()
}
