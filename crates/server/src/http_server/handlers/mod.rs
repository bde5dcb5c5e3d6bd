pub mod fetch;
pub mod file;
pub mod health;
pub mod link;
pub mod not_found;
pub mod raw;

use axum::http::HeaderMap;

use crate::State;

/// Build the externally addressable URL for a resource.
///
/// Prefers the configured external base URL; otherwise derives one from the
/// request's Host header, falling back to localhost.
pub(crate) fn resource_url(state: &State, headers: &HeaderMap, id: &str) -> String {
    let base = match state.external_url() {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(axum::http::header::HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("localhost:8888");
            if host.starts_with("http://") || host.starts_with("https://") {
                host.trim_end_matches('/').to_string()
            } else {
                format!("http://{}", host)
            }
        }
    };
    format!("{}/{}", base, id)
}
