//! Repository trait for short link data access.

use crate::domain::entities::{LinkRecord, LinkStats, NewLink};
use crate::domain::error::StoreError;
use async_trait::async_trait;

/// Repository interface shared by the storage backends.
///
/// Implementations translate their native errors into [`StoreError`] before
/// returning, so callers only ever see the shared taxonomy.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process map with file snapshots
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Stores a new link.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateUrl`] if the original URL is already
    /// stored. Nothing is written in that case.
    ///
    /// Returns [`StoreError::Internal`] on storage errors.
    async fn insert(&self, new_link: NewLink) -> Result<(), StoreError>;

    /// Resolves a short ID to its original URL.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no record matches
    /// - [`StoreError::Gone`] if the record is tombstoned
    async fn resolve(&self, short_id: &str) -> Result<String, StoreError>;

    /// Finds the short ID already representing `original_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the URL is unknown.
    async fn lookup_id_by_url(&self, original_url: &str) -> Result<String, StoreError>;

    /// Lists the non-deleted links owned by `owner_id`.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, StoreError>;

    /// Tombstones the given IDs, scoped to `owner_id`.
    ///
    /// IDs owned by someone else are left untouched without error. Returns the
    /// number of records that were marked.
    async fn soft_delete(&self, short_ids: &[String], owner_id: &str) -> Result<u64, StoreError>;

    /// Counts active links and distinct owners of active links.
    async fn count_active(&self) -> Result<LinkStats, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Releases backend resources. Called once at shutdown.
    async fn close(&self);
}
