//! Backend-agnostic link operations.

use std::sync::Arc;

use crate::domain::batch_pipeline::BatchPipeline;
use crate::domain::entities::{LinkRecord, LinkStats, NewLink};
use crate::domain::error::StoreError;
use crate::domain::repositories::LinkRepository;
use crate::utils::short_id::{SHORT_ID_LEN, generate_short_id};

/// Result of [`UrlService::shorten`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub id: String,
    /// False when the URL was already stored and `id` is the existing one.
    pub created: bool,
}

/// Outcome of a batch delete.
#[derive(Debug, Default)]
pub struct BatchDeleteReport {
    pub requested: usize,
    pub batches: usize,
    pub failed_items: usize,
    pub failures: Vec<StoreError>,
}

impl BatchDeleteReport {
    /// Returns true when every batch was applied.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Facade over the repository selected at startup.
///
/// Errors are passed through as [`StoreError`]; nothing is retried here.
pub struct UrlService {
    repository: Arc<dyn LinkRepository>,
    pipeline: BatchPipeline,
}

impl UrlService {
    pub fn new(repository: Arc<dyn LinkRepository>, pipeline: BatchPipeline) -> Self {
        Self {
            repository,
            pipeline,
        }
    }

    /// Stores `original_url` under `short_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateUrl`] if the URL is already stored.
    pub async fn save(
        &self,
        short_id: &str,
        original_url: &str,
        owner_id: &str,
    ) -> Result<(), StoreError> {
        self.repository
            .insert(NewLink::new(short_id, original_url, owner_id))
            .await?;

        metrics::counter!("links_created_total").increment(1);
        Ok(())
    }

    /// Generates a short ID for `original_url` and stores it.
    ///
    /// When the URL is already stored the existing ID is returned with
    /// `created = false`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Generation`] if no ID could be generated and
    /// [`StoreError::Internal`] on backend failure.
    pub async fn shorten(
        &self,
        original_url: &str,
        owner_id: &str,
    ) -> Result<Shortened, StoreError> {
        let id = generate_short_id(SHORT_ID_LEN)?;

        match self.save(&id, original_url, owner_id).await {
            Ok(()) => Ok(Shortened { id, created: true }),
            Err(StoreError::DuplicateUrl) => {
                let existing = self.lookup_id_by_url(original_url).await?;
                tracing::debug!(id = %existing, "URL already shortened");
                Ok(Shortened {
                    id: existing,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn resolve(&self, short_id: &str) -> Result<String, StoreError> {
        self.repository.resolve(short_id).await
    }

    pub async fn lookup_id_by_url(&self, original_url: &str) -> Result<String, StoreError> {
        self.repository.lookup_id_by_url(original_url).await
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, StoreError> {
        self.repository.list_by_owner(owner_id).await
    }

    /// Soft-deletes a single link. Returns false if nothing owned by
    /// `owner_id` matched.
    pub async fn delete_one(&self, short_id: &str, owner_id: &str) -> Result<bool, StoreError> {
        let affected = self
            .repository
            .soft_delete(&[short_id.to_string()], owner_id)
            .await?;

        Ok(affected > 0)
    }

    /// Soft-deletes `short_ids` owned by `owner_id` through the batch
    /// pipeline.
    ///
    /// IDs owned by someone else are left untouched. A failing batch does
    /// not abort the others; failures are collected in the report.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the backend is unreachable before
    /// any batch runs.
    pub async fn batch_delete(
        &self,
        short_ids: Vec<String>,
        owner_id: &str,
    ) -> Result<BatchDeleteReport, StoreError> {
        let requested = short_ids.len();
        if requested == 0 {
            return Ok(BatchDeleteReport::default());
        }

        self.repository.ping().await?;

        let repository = self.repository.clone();
        let owner: Arc<str> = Arc::from(owner_id);

        let report = self
            .pipeline
            .run(short_ids, move |batch: Vec<String>| {
                let repository = repository.clone();
                let owner = owner.clone();
                async move {
                    match repository.soft_delete(&batch, &owner).await {
                        Ok(affected) => {
                            metrics::counter!("links_deleted_batches_total").increment(1);
                            tracing::debug!(batch = batch.len(), affected, "Delete batch applied");
                            Ok(())
                        }
                        Err(e) => {
                            metrics::counter!("links_delete_failures_total").increment(1);
                            tracing::warn!(batch = batch.len(), error = %e, "Delete batch failed");
                            Err(e)
                        }
                    }
                }
            })
            .await;

        Ok(BatchDeleteReport {
            requested,
            batches: report.batches,
            failed_items: report.failed_items,
            failures: report.failures,
        })
    }

    pub async fn stats(&self) -> Result<LinkStats, StoreError> {
        self.repository.count_active().await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.repository.ping().await
    }

    /// Releases backend resources. Called once at shutdown.
    pub async fn close(&self) {
        self.repository.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch_pipeline::PipelineConfig;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::persistence::{KvStore, MemoryLinkRepository};
    use mockall::predicate::*;
    use std::time::Duration;

    fn memory_service() -> UrlService {
        UrlService::new(
            Arc::new(MemoryLinkRepository::new(Arc::new(KvStore::new()))),
            BatchPipeline::default(),
        )
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let service = memory_service();

        service
            .save("abc12345", "https://example.com", "user-1")
            .await
            .unwrap();
        assert_eq!(
            service.resolve("abc12345").await.unwrap(),
            "https://example.com"
        );

        let second = service
            .save("zzz99999", "https://example.com", "user-1")
            .await;
        assert_eq!(second, Err(StoreError::DuplicateUrl));
        assert_eq!(
            service
                .lookup_id_by_url("https://example.com")
                .await
                .unwrap(),
            "abc12345"
        );
    }

    #[tokio::test]
    async fn test_shorten_creates_then_recovers_existing() {
        let service = memory_service();

        let first = service.shorten("https://example.com/a", "u").await.unwrap();
        let second = service.shorten("https://example.com/a", "v").await.unwrap();

        assert!(first.created);
        assert_eq!(first.id.len(), SHORT_ID_LEN);
        assert!(!second.created);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_shorten_propagates_internal_error() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|_| Err(StoreError::internal("pool closed")));
        mock_repo.expect_lookup_id_by_url().never();

        let service = UrlService::new(Arc::new(mock_repo), BatchPipeline::default());

        let result = service.shorten("https://example.com", "u").await;

        assert!(matches!(result, Err(StoreError::Internal(_))));
    }

    #[tokio::test]
    async fn test_shorten_duplicate_uses_lookup() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|_| Err(StoreError::DuplicateUrl));
        mock_repo
            .expect_lookup_id_by_url()
            .with(eq("https://example.com"))
            .times(1)
            .returning(|_| Ok("existing".to_string()));

        let service = UrlService::new(Arc::new(mock_repo), BatchPipeline::default());

        let result = service.shorten("https://example.com", "u").await.unwrap();

        assert_eq!(
            result,
            Shortened {
                id: "existing".to_string(),
                created: false
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_gone_after_delete_one() {
        let service = memory_service();
        service
            .save("abc12345", "https://example.com", "user-1")
            .await
            .unwrap();

        assert!(!service.delete_one("abc12345", "intruder").await.unwrap());
        assert!(service.delete_one("abc12345", "user-1").await.unwrap());

        assert_eq!(
            service.resolve("abc12345").await,
            Err(StoreError::Gone {
                original_url: "https://example.com".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_batch_delete_owned_and_foreign() {
        let service = memory_service();

        let mut owned = Vec::new();
        for i in 0..45 {
            let id = format!("own{:05}", i);
            service
                .save(&id, &format!("https://example.com/{}", i), "owner")
                .await
                .unwrap();
            owned.push(id);
        }
        service
            .save("foreign0", "https://other.example", "someone-else")
            .await
            .unwrap();

        let mut ids = owned.clone();
        ids.push("foreign0".to_string());
        ids.push("missing0".to_string());

        let report = service.batch_delete(ids, "owner").await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.requested, 47);
        for id in &owned {
            assert!(matches!(
                service.resolve(id).await,
                Err(StoreError::Gone { .. })
            ));
        }
        assert_eq!(
            service.resolve("foreign0").await.unwrap(),
            "https://other.example"
        );
        assert!(service.list_by_owner("owner").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_delete_empty_is_noop() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_ping().never();
        mock_repo.expect_soft_delete().never();

        let service = UrlService::new(Arc::new(mock_repo), BatchPipeline::default());
        let report = service.batch_delete(Vec::new(), "owner").await.unwrap();

        assert_eq!(report.requested, 0);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_batch_delete_unreachable_backend() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_ping()
            .times(1)
            .returning(|| Err(StoreError::internal("connection refused")));
        mock_repo.expect_soft_delete().never();

        let service = UrlService::new(Arc::new(mock_repo), BatchPipeline::default());
        let result = service
            .batch_delete(vec!["a".to_string()], "owner")
            .await;

        assert!(matches!(result, Err(StoreError::Internal(_))));
    }

    #[tokio::test]
    async fn test_batch_delete_partial_failure() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_ping().returning(|| Ok(()));
        mock_repo.expect_soft_delete().returning(|batch, _| {
            if batch.iter().any(|id| id == "poison") {
                Err(StoreError::internal("deadlock detected"))
            } else {
                Ok(batch.len() as u64)
            }
        });

        let pipeline = BatchPipeline::new(PipelineConfig {
            workers: 1,
            batch_size: 2,
            flush_interval: Duration::from_secs(60),
        });
        let service = UrlService::new(Arc::new(mock_repo), pipeline);

        let ids = ["a", "b", "poison", "c", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let report = service.batch_delete(ids, "owner").await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.requested, 5);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failed_items, 2);
    }

    #[tokio::test]
    async fn test_stats_counts_active() {
        let service = memory_service();
        service.save("a0000000", "https://a.example", "u1").await.unwrap();
        service.save("b0000000", "https://b.example", "u2").await.unwrap();
        service.save("c0000000", "https://c.example", "u2").await.unwrap();
        service.delete_one("a0000000", "u1").await.unwrap();

        let stats = service.stats().await.unwrap();

        assert_eq!(stats, LinkStats { urls: 2, users: 1 });
    }
}
