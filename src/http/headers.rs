//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Append the caller to X-Forwarded-For, set X-Forwarded-Proto/Host
//! - Rewrite Host to the backend authority
//!
//! # Design Decisions
//! - Headers listed in `Connection` are treated as hop-by-hop too
//! - Framing headers are regenerated by hyper for each hop
//! - Existing X-Forwarded-For entries are kept; the caller is appended

use std::net::IpAddr;

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, CONNECTION, HOST, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION,
    TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};

use crate::routing::Endpoint;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");

const HOP_BY_HOP: [HeaderName; 8] = [
    CONNECTION,
    KEEP_ALIVE,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Returns true for headers that only describe a single connection.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Append the caller's IP to X-Forwarded-For.
pub fn append_forwarded_for(headers: &mut HeaderMap, client_ip: IpAddr) {
    let previous: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if previous.is_empty() {
        client_ip.to_string()
    } else {
        format!("{}, {}", previous.join(", "), client_ip)
    };

    // An IP list is always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

/// Prepare request headers for the backend.
///
/// `original_host` is the Host the caller addressed, recorded in
/// X-Forwarded-Host before Host is rewritten.
pub fn prepare_upstream_headers(
    headers: &mut HeaderMap,
    backend: &Endpoint,
    client_ip: IpAddr,
    original_host: Option<HeaderValue>,
) {
    strip_hop_by_hop(headers);
    append_forwarded_for(headers, client_ip);

    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }
    if let Some(host) = original_host {
        if !headers.contains_key(&X_FORWARDED_HOST) {
            headers.insert(X_FORWARDED_HOST, host);
        }
    }

    if let Ok(host) = HeaderValue::from_str(backend.authority().as_str()) {
        headers.insert(HOST, host);
    }
}
