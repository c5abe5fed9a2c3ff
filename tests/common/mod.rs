#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use sqlx::types::ipnetwork::IpNetwork;
use std::sync::Arc;
use std::time::Duration;
use tinylink::application::services::{IdentityProvider, UrlService};
use tinylink::domain::batch_pipeline::{BatchPipeline, PipelineConfig};
use tinylink::domain::entities::{LinkRecord, LinkStats, NewLink, UserId};
use tinylink::domain::error::StoreError;
use tinylink::domain::repositories::LinkRepository;
use tinylink::infrastructure::persistence::{KvStore, MemoryLinkRepository};
use tinylink::routes::router;
use tinylink::state::AppState;

pub const TEST_SECRET: &str = "test-identity-secret";
pub const BASE_URL: &str = "http://short.test";

pub fn identity() -> Arc<IdentityProvider> {
    Arc::new(IdentityProvider::new(
        TEST_SECRET,
        Duration::from_secs(3600),
        "auth_token",
    ))
}

/// `Cookie` header value carrying a valid identity for `user`.
pub fn cookie_for(user: &str) -> String {
    format!("auth_token={}", identity().issue(&UserId::new(user)).unwrap())
}

pub fn create_test_state(
    repository: Arc<dyn LinkRepository>,
    trusted_subnet: Option<IpNetwork>,
) -> AppState {
    let pipeline = BatchPipeline::new(PipelineConfig {
        workers: 4,
        batch_size: 5,
        flush_interval: Duration::from_millis(20),
    });
    let url_service = Arc::new(UrlService::new(repository, pipeline));

    AppState::new(url_service, identity(), BASE_URL, trusted_subnet)
}

pub fn create_memory_state() -> (AppState, Arc<KvStore>) {
    let store = Arc::new(KvStore::new());
    let repository = Arc::new(MemoryLinkRepository::new(store.clone()));

    (create_test_state(repository, None), store)
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}

/// Extracts the short ID from a short link produced with [`BASE_URL`].
pub fn short_id(short_url: &str) -> &str {
    short_url
        .strip_prefix(BASE_URL)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap()
}

/// Repository whose backend is down.
pub struct UnavailableRepository;

#[async_trait]
impl LinkRepository for UnavailableRepository {
    async fn insert(&self, _new_link: NewLink) -> Result<(), StoreError> {
        Err(StoreError::internal("connection refused"))
    }

    async fn resolve(&self, _short_id: &str) -> Result<String, StoreError> {
        Err(StoreError::internal("connection refused"))
    }

    async fn lookup_id_by_url(&self, _original_url: &str) -> Result<String, StoreError> {
        Err(StoreError::internal("connection refused"))
    }

    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<LinkRecord>, StoreError> {
        Err(StoreError::internal("connection refused"))
    }

    async fn soft_delete(&self, _short_ids: &[String], _owner_id: &str) -> Result<u64, StoreError> {
        Err(StoreError::internal("connection refused"))
    }

    async fn count_active(&self) -> Result<LinkStats, StoreError> {
        Err(StoreError::internal("connection refused"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::internal("connection refused"))
    }

    async fn close(&self) {}
}

/// Memory repository that answers `ping` but fails every delete batch
/// containing `poison_id`.
pub struct FlakyDeleteRepository {
    pub inner: MemoryLinkRepository,
    pub poison_id: String,
}

#[async_trait]
impl LinkRepository for FlakyDeleteRepository {
    async fn insert(&self, new_link: NewLink) -> Result<(), StoreError> {
        self.inner.insert(new_link).await
    }

    async fn resolve(&self, short_id: &str) -> Result<String, StoreError> {
        self.inner.resolve(short_id).await
    }

    async fn lookup_id_by_url(&self, original_url: &str) -> Result<String, StoreError> {
        self.inner.lookup_id_by_url(original_url).await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, StoreError> {
        self.inner.list_by_owner(owner_id).await
    }

    async fn soft_delete(&self, short_ids: &[String], owner_id: &str) -> Result<u64, StoreError> {
        if short_ids.iter().any(|id| id == &self.poison_id) {
            return Err(StoreError::internal("deadlock detected"));
        }
        self.inner.soft_delete(short_ids, owner_id).await
    }

    async fn count_active(&self) -> Result<LinkStats, StoreError> {
        self.inner.count_active().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}
}
