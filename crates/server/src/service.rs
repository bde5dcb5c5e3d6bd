//! Resource ingestion and retrieval operations.
//!
//! All operations return tagged [`ServiceError`] kinds; only the HTTP layer
//! translates kinds into status codes.

use tokio::fs::File;
use tokio::io::AsyncRead;

use store::{ident, transfer, BlobStore, Database, StoreError};

/// Sentinel mime type marking a link-type resource.
pub const LINK_MIME: &str = "text/uri-list";

/// Content type assumed when none is supplied.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Display name used when a resource has none.
pub const DEFAULT_NAME: &str = "file";

/// What retrieval of an identifier yields.
#[derive(Debug)]
pub enum StoredContent {
    /// Link-type resource: redirect to the target URL.
    Link { target: String },
    /// Blob-type resource: stream the stored bytes.
    Blob {
        reader: File,
        size: u64,
        mime_type: String,
        name: String,
    },
}

/// Orchestrates the identifier policy, index, blob store, and transfer
/// engine behind the three ingestion modes and one retrieval mode.
#[derive(Debug, Clone)]
pub struct ResourceService {
    database: Database,
    blobs: BlobStore,
}

impl ResourceService {
    pub fn new(database: Database, blobs: BlobStore) -> Self {
        Self { database, blobs }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Resolve the identifier for a new resource.
    ///
    /// A client-supplied identifier must match the generated alphabet
    /// (ASCII alphanumeric, length-capped) before it may be used as an index
    /// or blob key; absent one, a fresh identifier is generated.
    pub fn resolve_id(&self, supplied: Option<String>) -> Result<String, ServiceError> {
        match supplied {
            Some(id) => {
                if ident::is_valid(&id) {
                    Ok(id)
                } else {
                    Err(ServiceError::InvalidInput(format!(
                        "identifier must be 1-{} alphanumeric characters: {id:?}",
                        ident::MAX_LENGTH
                    )))
                }
            }
            None => Ok(ident::generate(ident::DEFAULT_LENGTH)),
        }
    }

    /// Register a URL alias. Returns the resolved identifier.
    pub async fn register_link(
        &self,
        id: Option<String>,
        name: Option<String>,
        target: &str,
    ) -> Result<String, ServiceError> {
        if !is_http_url(target) {
            return Err(ServiceError::InvalidInput(format!(
                "link target must be an absolute http(s) URL: {target:?}"
            )));
        }
        let id = self.resolve_id(id)?;
        self.database
            .insert_resource(&id, LINK_MIME, name.as_deref(), target)
            .await?;
        tracing::info!(id, target, "registered link");
        Ok(id)
    }

    /// Stream a payload into a new blob keyed by `id`.
    ///
    /// A transfer failure removes the partial blob before propagating.
    pub async fn store_blob<R>(&self, id: &str, source: &mut R) -> Result<u64, ServiceError>
    where
        R: AsyncRead + Unpin,
    {
        let mut sink = self.blobs.create(id).await?;
        match transfer::copy(source, &mut sink, transfer::DEFAULT_BUFFER_SIZE).await {
            Ok(written) => Ok(written),
            Err(err) => {
                drop(sink);
                self.blobs.discard(id).await;
                Err(ServiceError::Io(err))
            }
        }
    }

    /// Remove a blob written for a request that later failed, so the
    /// identifier stays available. Best effort.
    pub async fn discard_blob(&self, id: &str) {
        self.blobs.discard(id).await;
    }

    /// Record the index entry for a blob written under `id`.
    ///
    /// The locator of a blob-type resource equals its identifier. If the
    /// insert fails the blob is removed, so no orphan is left behind.
    pub async fn record_blob(
        &self,
        id: &str,
        mime_type: &str,
        name: Option<&str>,
    ) -> Result<(), ServiceError> {
        if let Err(err) = self
            .database
            .insert_resource(id, mime_type, name, id)
            .await
        {
            self.blobs.discard(id).await;
            return Err(err.into());
        }
        tracing::info!(id, mime_type, "stored resource");
        Ok(())
    }

    /// Raw-body ingestion: resolve the identifier, stream the payload into a
    /// blob, then record the index entry. Returns the resolved identifier.
    pub async fn store_stream<R>(
        &self,
        id: Option<String>,
        name: Option<String>,
        mime_type: &str,
        mut source: R,
    ) -> Result<String, ServiceError>
    where
        R: AsyncRead + Unpin,
    {
        let id = self.resolve_id(id)?;
        self.store_blob(&id, &mut source).await?;
        self.record_blob(&id, mime_type, name.as_deref()).await?;
        Ok(id)
    }

    /// Look up an identifier for retrieval.
    pub async fn fetch(&self, id: &str) -> Result<StoredContent, ServiceError> {
        let resource = self
            .database
            .find_resource(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        if resource.mime_type == LINK_MIME && is_http_url(&resource.locator) {
            return Ok(StoredContent::Link {
                target: resource.locator,
            });
        }

        let (reader, size) = self.blobs.open_read(&resource.locator).await?;
        Ok(StoredContent::Blob {
            reader,
            size,
            mime_type: resource.mime_type,
            name: resource.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        })
    }
}

/// Whether a string parses as an absolute `http` or `https` URL.
fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("identifier already in use: {0}")]
    Conflict(String),
    #[error("unknown identifier: {0}")]
    NotFound(String),
    #[error("transfer failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("storage backend error: {0}")]
    Internal(#[source] StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(key) => ServiceError::Conflict(key),
            StoreError::NotFound(key) => ServiceError::NotFound(key),
            StoreError::InvalidKey(key) => {
                ServiceError::InvalidInput(format!("invalid identifier: {key:?}"))
            }
            other => ServiceError::Internal(other),
        }
    }
}
