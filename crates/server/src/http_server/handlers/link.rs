use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::http_server::error::ApiError;
use crate::service::ServiceError;
use crate::State as ServiceState;

use super::resource_url;

#[derive(Debug, Deserialize)]
pub struct LinkParams {
    /// Optional identifier for the alias; generated when absent
    pub id: Option<String>,
    /// Optional display name
    pub name: Option<String>,
    /// Target URL; required, must be absolute http(s). Only checked after
    /// authorization so unauthenticated callers always get 403
    pub path: Option<String>,
}

/// `POST /_/link` - register a URL alias.
pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<LinkParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    state
        .guard()
        .authorize(headers.get(axum::http::header::AUTHORIZATION))?;

    let path = params.path.ok_or_else(|| {
        ApiError::Service(ServiceError::InvalidInput(
            "missing required parameter: path".to_string(),
        ))
    })?;

    let id = state
        .resources()
        .register_link(params.id, params.name, &path)
        .await?;

    let url = resource_url(&state, &headers, &id);
    Ok((http::StatusCode::OK, url).into_response())
}
