//! End-to-end routing tests against in-process backends.

use std::convert::Infallible;

use axum::{body::Body, http::StatusCode, response::Response, Router};
use futures_util::stream;

use api_gateway::http::fallback::GREETING;

mod common;

use common::{client, route, start_backend, start_echo_backend, start_gateway};

async fn standard_gateway() -> common::TestGateway {
    let orders = start_echo_backend("orders").await;
    let auth = start_echo_backend("auth").await;
    let users = start_echo_backend("users").await;

    start_gateway(vec![
        route("orders", "/orders", orders, true),
        route("auth", "/auth", auth, false),
        route("users", "/users", users, false),
    ])
    .await
}

#[tokio::test]
async fn test_strip_prefix_route() {
    let gateway = standard_gateway().await;

    let res = client().get(gateway.url("/orders/42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-backend"], "orders");
    assert_eq!(res.text().await.unwrap(), "GET /42");

    let res = client().get(gateway.url("/orders")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "GET /");
}

#[tokio::test]
async fn test_passthrough_routes() {
    let gateway = standard_gateway().await;

    let res = client().get(gateway.url("/auth/login")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "auth");
    assert_eq!(res.text().await.unwrap(), "GET /auth/login");

    let res = client().get(gateway.url("/users/7/profile")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "users");
    assert_eq!(res.text().await.unwrap(), "GET /users/7/profile");
}

#[tokio::test]
async fn test_query_string_preserved() {
    let gateway = standard_gateway().await;

    let res = client()
        .get(gateway.url("/orders/42?expand=items&page=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "GET /42?expand=items&page=2");
}

#[tokio::test]
async fn test_unmatched_paths_get_fallback() {
    let gateway = standard_gateway().await;

    for path in ["/", "/unknown/path", "/ordersX"] {
        let res = client().get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "path {path}");
        assert!(res.headers().get("x-backend").is_none());
        assert_eq!(res.text().await.unwrap(), GREETING);
    }
}

#[tokio::test]
async fn test_longest_prefix_wins() {
    let orders = start_echo_backend("orders").await;
    let special = start_echo_backend("special").await;
    let gateway = start_gateway(vec![
        route("orders", "/orders", orders, true),
        route("special", "/orders/special", special, false),
    ])
    .await;

    let res = client().get(gateway.url("/orders/special/9")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "special");
    assert_eq!(res.text().await.unwrap(), "GET /orders/special/9");

    let res = client().get(gateway.url("/orders/9")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "orders");
    assert_eq!(res.text().await.unwrap(), "GET /9");
}

#[tokio::test]
async fn test_forwarding_headers() {
    let auth = start_echo_backend("auth").await;
    let gateway = start_gateway(vec![route("auth", "/auth", auth, false)]).await;

    let res = client()
        .get(gateway.url("/auth/me"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-seen-host"], auth.to_string().as_str());
    assert_eq!(res.headers()["x-seen-forwarded-for"], "127.0.0.1");
    assert_eq!(res.headers()["x-seen-forwarded-host"], gateway.addr.to_string().as_str());
    assert_eq!(res.headers()["x-seen-request-id"], "trace-me");
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn test_generated_request_id_reaches_backend() {
    let auth = start_echo_backend("auth").await;
    let gateway = start_gateway(vec![route("auth", "/auth", auth, false)]).await;

    let res = client().get(gateway.url("/auth")).send().await.unwrap();
    let seen = res.headers()["x-seen-request-id"].to_str().unwrap().to_string();
    assert!(!seen.is_empty());
    assert_eq!(res.headers()["x-request-id"], seen.as_str());
}

#[tokio::test]
async fn test_request_body_and_method_forwarded() {
    let orders = start_echo_backend("orders").await;
    let gateway = start_gateway(vec![route("orders", "/orders", orders, true)]).await;

    let payload = vec![b'x'; 1024 * 1024];
    let res = client()
        .post(gateway.url("/orders/new"))
        .body(payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-body-len"], "1048576");
    assert_eq!(res.text().await.unwrap(), "POST /new");

    let res = client().delete(gateway.url("/orders/5")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "DELETE /5");
}

#[tokio::test]
async fn test_streamed_response_round_trip() {
    const CHUNK: usize = 16 * 1024;
    const CHUNKS: usize = 64;

    let app = Router::new().fallback(|| async {
        let chunks = (0..CHUNKS).map(|i| Ok::<_, Infallible>(vec![(i % 251) as u8; CHUNK]));
        Response::builder()
            .status(StatusCode::CREATED)
            .header("x-custom", "kept")
            .header("content-type", "application/octet-stream")
            .body(Body::from_stream(stream::iter(chunks)))
            .unwrap()
    });
    let backend = start_backend(app).await;
    let gateway = start_gateway(vec![route("files", "/files", backend, false)]).await;

    let res = client().get(gateway.url("/files/big")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-custom"], "kept");
    assert_eq!(res.headers()["content-type"], "application/octet-stream");

    let body = res.bytes().await.unwrap();
    let expected: Vec<u8> = (0..CHUNKS)
        .flat_map(|i| std::iter::repeat((i % 251) as u8).take(CHUNK))
        .collect();
    assert_eq!(body.len(), CHUNK * CHUNKS);
    assert!(body[..] == expected[..]);
}

#[tokio::test]
async fn test_backend_status_relayed_verbatim() {
    let app = Router::new().fallback(|| async { (StatusCode::NOT_FOUND, "no such order") });
    let backend = start_backend(app).await;
    let gateway = start_gateway(vec![route("orders", "/orders", backend, true)]).await;

    let res = client().get(gateway.url("/orders/404")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "no such order");
}
