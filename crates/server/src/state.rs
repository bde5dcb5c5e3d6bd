use store::{BlobStore, Database, StoreError};

use crate::auth::AccessGuard;
use crate::config::Config;
use crate::service::ResourceService;

/// Main service state - database, blob store, and access guard.
#[derive(Clone)]
pub struct State {
    resources: ResourceService,
    guard: AccessGuard,
    external_url: Option<String>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let database = match &config.sqlite_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "opening database");
                Database::new(path).await?
            }
            None => Database::in_memory().await?,
        };

        // 2. Setup blob store
        let uploads_path = config.uploads_path();
        tracing::info!(path = %uploads_path.display(), "opening blob store");
        let blobs = BlobStore::open(uploads_path).await?;

        Ok(Self {
            resources: ResourceService::new(database, blobs),
            guard: AccessGuard::new(&config.api_key),
            external_url: config.external_url.clone(),
        })
    }

    pub fn resources(&self) -> &ResourceService {
        &self.resources
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    pub fn external_url(&self) -> Option<&str> {
        self.external_url.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("storage setup error: {0}")]
    Store(#[from] StoreError),
}
