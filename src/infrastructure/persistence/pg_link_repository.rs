//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::{LinkRecord, LinkStats, NewLink};
use crate::domain::error::StoreError;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::PgConnector;

#[derive(Debug, sqlx::FromRow)]
struct UrlRow {
    id: String,
    owner_id: String,
    original_url: String,
    deleted: i32,
}

impl From<UrlRow> for LinkRecord {
    fn from(row: UrlRow) -> Self {
        Self {
            short_id: row.id,
            original_url: row.original_url,
            owner_id: row.owner_id,
            deleted: row.deleted != 0,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses prepared statements with bound parameters. The dedup invariant is
/// enforced by the `UNIQUE` constraint on `original_url`, which also covers
/// tombstoned rows.
pub struct PgLinkRepository {
    connector: Arc<PgConnector>,
}

impl PgLinkRepository {
    /// Creates a new repository over a (possibly not yet connected) pool.
    pub fn new(connector: Arc<PgConnector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<(), StoreError> {
        let pool = self.connector.pool().await?;

        let inserted = self
            .connector
            .run(
                sqlx::query_scalar::<_, String>(
                    r#"
                    INSERT INTO urls (id, original_url, owner_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (original_url) DO NOTHING
                    RETURNING id
                    "#,
                )
                .bind(&new_link.short_id)
                .bind(&new_link.original_url)
                .bind(&new_link.owner_id)
                .fetch_optional(pool),
            )
            .await?;

        match inserted {
            Some(_) => Ok(()),
            None => Err(StoreError::DuplicateUrl),
        }
    }

    async fn resolve(&self, short_id: &str) -> Result<String, StoreError> {
        let pool = self.connector.pool().await?;

        let row = self
            .connector
            .run(
                sqlx::query_as::<_, (String, i32)>(
                    "SELECT original_url, deleted FROM urls WHERE id = $1",
                )
                .bind(short_id)
                .fetch_optional(pool),
            )
            .await?;

        match row {
            None => Err(StoreError::NotFound),
            Some((original_url, deleted)) if deleted != 0 => Err(StoreError::Gone { original_url }),
            Some((original_url, _)) => Ok(original_url),
        }
    }

    async fn lookup_id_by_url(&self, original_url: &str) -> Result<String, StoreError> {
        let pool = self.connector.pool().await?;

        self.connector
            .run(
                sqlx::query_scalar::<_, String>("SELECT id FROM urls WHERE original_url = $1")
                    .bind(original_url)
                    .fetch_optional(pool),
            )
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, StoreError> {
        let pool = self.connector.pool().await?;

        let rows = self
            .connector
            .run(
                sqlx::query_as::<_, UrlRow>(
                    r#"
                    SELECT id, owner_id, original_url, deleted
                    FROM urls
                    WHERE owner_id = $1 AND deleted = 0
                    ORDER BY id
                    "#,
                )
                .bind(owner_id)
                .fetch_all(pool),
            )
            .await?;

        Ok(rows.into_iter().map(LinkRecord::from).collect())
    }

    async fn soft_delete(&self, short_ids: &[String], owner_id: &str) -> Result<u64, StoreError> {
        if short_ids.is_empty() {
            return Ok(0);
        }

        let pool = self.connector.pool().await?;

        let result = self
            .connector
            .run(
                sqlx::query(
                    r#"
                    UPDATE urls
                    SET deleted = 1
                    WHERE owner_id = $1 AND id = ANY($2) AND deleted = 0
                    "#,
                )
                .bind(owner_id)
                .bind(short_ids)
                .execute(pool),
            )
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_active(&self) -> Result<LinkStats, StoreError> {
        let pool = self.connector.pool().await?;

        let (urls, users) = self
            .connector
            .run(
                sqlx::query_as::<_, (i64, i64)>(
                    r#"
                    SELECT
                        COUNT(*) FILTER (WHERE deleted = 0),
                        COUNT(DISTINCT owner_id) FILTER (WHERE deleted = 0)
                    FROM urls
                    "#,
                )
                .fetch_one(pool),
            )
            .await?;

        Ok(LinkStats { urls, users })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let pool = self.connector.pool().await?;

        self.connector
            .run(sqlx::query("SELECT 1").execute(pool))
            .await
            .map(|_| ())
    }

    async fn close(&self) {
        self.connector.close().await;
    }
}
