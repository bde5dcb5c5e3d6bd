use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use store::transfer;

use crate::http_server::error::ApiError;
use crate::service::StoredContent;
use crate::State as ServiceState;

/// `GET /{id}` - retrieve a resource. Unauthenticated by design.
///
/// Link-type resources answer with a redirect; blob-type resources stream
/// the stored bytes with the recorded content type and an inline
/// content-disposition filename hint.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.resources().fetch(&id).await? {
        StoredContent::Link { target } => Ok((
            http::StatusCode::FOUND,
            [(axum::http::header::LOCATION, target)],
        )
            .into_response()),
        StoredContent::Blob {
            mut reader,
            size,
            mime_type,
            name,
        } => {
            // Pipe the blob through the transfer engine into the response
            // body; the copy lives exactly as long as the response stream.
            let (mut sink, source) = tokio::io::duplex(transfer::DEFAULT_BUFFER_SIZE);
            tokio::spawn(async move {
                if let Err(err) =
                    transfer::copy(&mut reader, &mut sink, transfer::DEFAULT_BUFFER_SIZE).await
                {
                    tracing::warn!(id, "download stream aborted: {err}");
                }
            });

            let disposition = format!("inline; filename=\"{}\"", disposition_filename(&name));
            Ok((
                http::StatusCode::OK,
                [
                    (axum::http::header::CONTENT_TYPE, mime_type),
                    (axum::http::header::CONTENT_LENGTH, size.to_string()),
                    (axum::http::header::CONTENT_DISPOSITION, disposition),
                ],
                Body::from_stream(ReaderStream::new(source)),
            )
                .into_response())
        }
    }
}

/// Reduce a stored name to something safe inside a quoted
/// `Content-Disposition` filename. Quotes, backslashes, control bytes, and
/// non-ASCII characters would malform the header value, so they are
/// replaced.
fn disposition_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
