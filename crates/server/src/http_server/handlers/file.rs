use axum::extract::{Multipart, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use serde::Deserialize;
use tokio_util::io::StreamReader;

use crate::http_server::error::ApiError;
use crate::service::{ServiceError, DEFAULT_MIME, DEFAULT_NAME};
use crate::State as ServiceState;

use super::resource_url;

#[derive(Debug, Deserialize)]
pub struct FileParams {
    /// Optional identifier; may also arrive as a form field
    pub id: Option<String>,
    /// Optional display name; may also arrive as a form field
    pub name: Option<String>,
}

/// `POST /_/file` - upload a file as a multipart body.
///
/// Parts are scanned in arrival order. Form fields named `id` and `name`
/// override the query-parameter defaults; the first file part fixes the
/// content type and, if no name was set, the display name. The file bytes
/// stream straight into the blob store; the index entry is recorded after
/// all parts are consumed. If the body errors after the file part was
/// written, the blob is removed so the identifier stays available.
pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<FileParams>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    state
        .guard()
        .authorize(headers.get(axum::http::header::AUTHORIZATION))?;

    let mut id = params.id;
    let mut name = params.name;
    // Resolved identifier and content type, set once the file part is stored.
    let mut stored: Option<(String, String)> = None;

    if let Err(err) = consume_parts(&state, &mut multipart, &mut id, &mut name, &mut stored).await {
        if let Some((id, _)) = &stored {
            state.resources().discard_blob(id).await;
        }
        return Err(err);
    }

    let (id, mime_type) = stored.ok_or_else(|| {
        ApiError::Service(ServiceError::InvalidInput(
            "multipart body contains no file part".to_string(),
        ))
    })?;
    state
        .resources()
        .record_blob(&id, &mime_type, name.as_deref())
        .await?;

    let url = resource_url(&state, &headers, &id);
    Ok((http::StatusCode::OK, url).into_response())
}

/// Drain the multipart body, writing the first file part into the blob
/// store. An error anywhere leaves `stored` describing whatever blob was
/// already written, so the caller can compensate.
async fn consume_parts(
    state: &ServiceState,
    multipart: &mut Multipart,
    id: &mut Option<String>,
    name: &mut Option<String>,
    stored: &mut Option<(String, String)>,
) -> Result<(), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        let is_file = field.file_name().is_some() || field.content_type().is_some();

        match field_name.as_deref() {
            Some("id") if !is_file => {
                let value = field.text().await?;
                if stored.is_some() {
                    // The blob key is already fixed; honoring a late override
                    // would strand the written bytes under the old key.
                    tracing::warn!("ignoring id field received after file content");
                } else {
                    *id = Some(value);
                }
            }
            Some("name") if !is_file => {
                *name = Some(field.text().await?);
            }
            _ if is_file => {
                if stored.is_some() {
                    tracing::warn!("ignoring additional file part");
                    continue;
                }

                let resolved = state.resources().resolve_id(id.clone())?;
                let mime_type = field
                    .content_type()
                    .map(str::to_owned)
                    .or_else(|| {
                        field
                            .file_name()
                            .map(|f| mime_guess::from_path(f).first_or_octet_stream().to_string())
                    })
                    .unwrap_or_else(|| DEFAULT_MIME.to_string());
                if name.is_none() {
                    *name = Some(
                        field
                            .file_name()
                            .map(str::to_owned)
                            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
                    );
                }

                let mut reader = StreamReader::new(
                    field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err)),
                );
                state.resources().store_blob(&resolved, &mut reader).await?;
                *stored = Some((resolved, mime_type));
            }
            _ => {
                tracing::warn!(field = ?field_name, "ignoring unrecognized multipart field");
            }
        }
    }
    Ok(())
}
