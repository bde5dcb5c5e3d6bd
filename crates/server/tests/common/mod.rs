//! Shared test utilities for the HTTP API tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tempfile::TempDir;
use tower::util::ServiceExt;

use server::http_server::router;
use server::{Config, State};

pub const API_KEY: &str = "test-api-key";

/// Set up a test environment: in-memory index, tempdir-backed blob store,
/// and the full application router.
pub async fn setup() -> (Router, TempDir) {
    let temp = TempDir::new().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        storage_path: temp.path().to_path_buf(),
        uploads_path: None,
        sqlite_path: None,
        api_key: API_KEY.to_string(),
        external_url: None,
        log_level: tracing::Level::INFO,
        log_dir: None,
    };
    let state = State::from_config(&config).await.unwrap();
    (router(state), temp)
}

pub fn bearer() -> String {
    format!("Bearer {}", API_KEY)
}

/// Dispatch a single request against a clone of the router.
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

/// Read a response body to a byte vector.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Read a response body to a string.
pub async fn body_string(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Extract the identifier from a returned resource URL.
pub fn id_from_url(url: &str) -> String {
    url.rsplit('/').next().unwrap().to_string()
}
