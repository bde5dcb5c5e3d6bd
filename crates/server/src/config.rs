use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Name of the SQLite database file under the storage directory.
pub const DATABASE_FILE_NAME: &str = "shelf.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// address for the HTTP server to listen on
    pub listen_addr: SocketAddr,

    // storage configuration
    /// base storage directory; holds the database and, by default,
    ///  the uploads directory
    pub storage_path: PathBuf,
    /// directory for uploaded blobs,
    ///  if not set then `<storage_path>/uploads` is used
    pub uploads_path: Option<PathBuf>,
    /// path to the sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // auth
    /// the single API key accepted on mutating operations
    pub api_key: String,

    // url configuration
    /// external base URL for generated resource links
    ///  (e.g. "https://drop.example.com"); if not set the request's
    ///  Host header is used
    pub external_url: Option<String>,

    // logging
    pub log_level: tracing::Level,
    /// directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Build a configuration from environment variables.
    ///
    /// Reads `STORAGE_PATH` (default `.`), `UPLOADS_PATH`, `API_KEY`
    /// (required; startup fails without it) and `EXTERNAL_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("API_KEY").map_err(|_| ConfigError::MissingApiKey)?;
        let storage_path =
            PathBuf::from(std::env::var("STORAGE_PATH").unwrap_or_else(|_| ".".to_string()));
        let uploads_path = std::env::var("UPLOADS_PATH").ok().map(PathBuf::from);
        let external_url = std::env::var("EXTERNAL_URL").ok();

        Ok(Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8888),
            sqlite_path: Some(storage_path.join(DATABASE_FILE_NAME)),
            storage_path,
            uploads_path,
            api_key,
            external_url,
            log_level: tracing::Level::INFO,
            log_dir: None,
        })
    }

    /// Directory uploaded blobs are written to.
    pub fn uploads_path(&self) -> PathBuf {
        self.uploads_path
            .clone()
            .unwrap_or_else(|| self.storage_path.join("uploads"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the API_KEY environment variable must be set")]
    MissingApiKey,
}
