//! Storage error taxonomy shared by every backend.
//!
//! Backend-specific failures (driver error codes, I/O errors) are translated
//! into [`StoreError`] inside the adapters, so nothing backend-specific reaches
//! [`crate::application::services::UrlService`] or the HTTP layer.

use thiserror::Error;

/// Errors produced by link storage and identity operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The original URL is already stored. Recover the existing short ID with
    /// a lookup by URL.
    #[error("original URL is already shortened")]
    DuplicateUrl,

    /// No record matches the short ID.
    #[error("short link not found")]
    NotFound,

    /// The record exists but has been soft-deleted.
    #[error("short link has been deleted")]
    Gone { original_url: String },

    /// The random source could not produce an identifier.
    #[error("failed to generate identifier: {0}")]
    Generation(String),

    /// A snapshot file could not be read or written.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Pool, connection, timeout or query failure.
    #[error("storage error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
