//! Shelf server - HTTP surface and process lifecycle for the content-drop service.
//!
//! This crate wires the storage core (`shelf-store`) into an axum HTTP
//! server:
//! - Config (environment variables with CLI overrides)
//! - State (database + blob store + access guard)
//! - ResourceService (ingestion and retrieval operations)
//! - HTTP handlers (link registration, file/raw upload, retrieval, health)
//! - Process lifecycle (logging, panic hook, graceful shutdown)

pub mod auth;
pub mod config;
pub mod http_server;
pub mod process;
pub mod service;
pub mod state;

// Re-export key types for convenience
pub use config::{Config, ConfigError};
pub use service::{ResourceService, ServiceError};
pub use state::{State, StateSetupError};
