//! Bearer-token access guard for mutating operations.

use std::sync::Arc;

use axum::http::HeaderValue;

/// Validates the `Authorization` header on write requests.
///
/// Exactly one static API key is configured; retrieval is deliberately
/// unauthenticated. The comparison is a plain string match, mirroring the
/// reference behavior (no hashing, no timing-safe compare).
#[derive(Debug, Clone)]
pub struct AccessGuard {
    api_key: Arc<str>,
}

impl AccessGuard {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
        }
    }

    /// Check a request's `Authorization` header.
    ///
    /// The header must be present and have the exact form `Bearer <token>`
    /// with the configured key as token.
    pub fn authorize(&self, header: Option<&HeaderValue>) -> Result<(), AuthError> {
        let value = header
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingHeader)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedHeader)?;
        if token != self.api_key.as_ref() {
            return Err(AuthError::InvalidToken);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid bearer token")]
    InvalidToken,
}
