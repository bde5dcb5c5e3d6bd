use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use serde::Deserialize;
use tokio_util::io::StreamReader;

use crate::http_server::error::ApiError;
use crate::service::{ServiceError, DEFAULT_MIME};
use crate::State as ServiceState;

use super::resource_url;

#[derive(Debug, Deserialize)]
pub struct RawParams {
    /// Optional identifier; generated when absent
    pub id: Option<String>,
    /// Display name for the stored resource; required, but only checked
    /// after authorization so unauthenticated callers always get 403
    pub name: Option<String>,
}

/// `POST /_/raw` - store the raw request body as a blob.
///
/// The request's `Content-Type` header is honored as the stored type.
pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<RawParams>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    state
        .guard()
        .authorize(headers.get(axum::http::header::AUTHORIZATION))?;

    let name = params.name.ok_or_else(|| {
        ApiError::Service(ServiceError::InvalidInput(
            "missing required parameter: name".to_string(),
        ))
    })?;

    let mime_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_MIME)
        .to_string();

    let reader = StreamReader::new(
        body.into_data_stream()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err)),
    );

    let id = state
        .resources()
        .store_stream(params.id, Some(name), &mime_type, reader)
        .await?;

    let url = resource_url(&state, &headers, &id);
    Ok((http::StatusCode::OK, url).into_response())
}
