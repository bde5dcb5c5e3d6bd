//! Shelf - personal content-drop service.
//!
//! Upload a file, a raw byte stream, or a URL alias and get back a short
//! link; anyone holding the link gets the original bytes or a redirect.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use server::config::DATABASE_FILE_NAME;
use server::{process, Config};

/// Shelf - personal content-drop service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value = "8888")]
    port: u16,

    /// Base storage directory (overrides STORAGE_PATH)
    #[arg(long)]
    storage_path: Option<PathBuf>,

    /// Directory for uploaded blobs (overrides UPLOADS_PATH)
    #[arg(long)]
    uploads_path: Option<PathBuf>,

    /// External base URL for generated links (overrides EXTERNAL_URL)
    #[arg(long)]
    external_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(2);
        }
    };

    config.listen_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), args.port);
    if let Some(storage_path) = args.storage_path {
        config.sqlite_path = Some(storage_path.join(DATABASE_FILE_NAME));
        config.storage_path = storage_path;
    }
    if let Some(uploads_path) = args.uploads_path {
        config.uploads_path = Some(uploads_path);
    }
    if let Some(external_url) = args.external_url {
        config.external_url = Some(external_url);
    }
    config.log_level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    config.log_dir = args.log_dir;

    process::spawn_service(&config).await;

    Ok(())
}
