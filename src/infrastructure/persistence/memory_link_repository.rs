//! In-memory implementation of link repository.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::{LinkRecord, LinkStats, NewLink};
use crate::domain::error::StoreError;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::KvStore;

/// Link repository backed by a shared [`KvStore`].
///
/// Duplicate detection only considers active records, so the URL of a
/// deleted link can be shortened again.
pub struct MemoryLinkRepository {
    store: Arc<KvStore>,
}

impl MemoryLinkRepository {
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<KvStore> {
        &self.store
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<(), StoreError> {
        self.store.insert_unique(new_link)
    }

    async fn resolve(&self, short_id: &str) -> Result<String, StoreError> {
        match self.store.record(short_id) {
            Some(record) if record.deleted => Err(StoreError::Gone {
                original_url: record.original_url,
            }),
            Some(record) => Ok(record.original_url),
            None => Err(StoreError::NotFound),
        }
    }

    async fn lookup_id_by_url(&self, original_url: &str) -> Result<String, StoreError> {
        self.store
            .find_id_by_url(original_url)
            .ok_or(StoreError::NotFound)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, StoreError> {
        Ok(self.store.list_by_owner(owner_id))
    }

    async fn soft_delete(&self, short_ids: &[String], owner_id: &str) -> Result<u64, StoreError> {
        Ok(self.store.mark_deleted(short_ids, owner_id))
    }

    async fn count_active(&self) -> Result<LinkStats, StoreError> {
        Ok(self.store.count_active())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}
}
