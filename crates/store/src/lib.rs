//! Resource storage for shelf.
//!
//! This crate provides the storage core of the content-drop service:
//!
//! - SQLite-backed resource index mapping short identifiers to metadata
//! - Filesystem blob store with must-create write semantics
//! - Chunked byte-copy primitive shared by uploads and downloads
//! - Short identifier generation and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use store::{BlobStore, Database};
//!
//! # async fn example() -> store::Result<()> {
//! let database = Database::new(std::path::Path::new("/tmp/shelf.db")).await?;
//! let blobs = BlobStore::open("/tmp/uploads").await?;
//!
//! let id = store::ident::generate(store::ident::DEFAULT_LENGTH);
//! let _sink = blobs.create(&id).await?;
//! # Ok(())
//! # }
//! ```

mod blobs;
mod database;
mod error;
pub mod ident;
pub mod transfer;

pub use blobs::BlobStore;
pub use database::{Database, Resource};
pub use error::{Result, StoreError};
