//! Lazily created PostgreSQL connection pool.

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;
use tokio::time;

use crate::domain::error::StoreError;
use crate::utils::db_error::map_sqlx_error;

/// Pool settings taken from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub database_url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    /// Upper bound for every individual query.
    pub query_timeout: Duration,
}

/// Owns the process-wide connection pool.
///
/// The pool is created on first use (connect, migrate, ping) and reused until
/// [`PgConnector::close`]. A failed initialization fails only the calling
/// operation; the next call tries again.
pub struct PgConnector {
    settings: Option<PgSettings>,
    query_timeout: Duration,
    pool: OnceCell<PgPool>,
}

impl PgConnector {
    pub fn new(settings: PgSettings) -> Self {
        Self {
            query_timeout: settings.query_timeout,
            settings: Some(settings),
            pool: OnceCell::new(),
        }
    }

    /// Wraps an already connected pool. Used by tests and tools that manage
    /// the pool themselves.
    pub fn from_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            settings: None,
            query_timeout,
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Returns the pool, connecting on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if connecting, migrating or pinging
    /// fails.
    pub async fn pool(&self) -> Result<&PgPool, StoreError> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<PgPool, StoreError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| StoreError::internal("database is not configured"))?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.connect_timeout)
            .idle_timeout(settings.idle_timeout)
            .max_lifetime(settings.max_lifetime)
            .connect(&settings.database_url)
            .await
            .map_err(|e| StoreError::Internal(format!("failed to connect to database: {}", e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Internal(format!("failed to migrate database: {}", e)))?;

        self.run(sqlx::query("SELECT 1").execute(&pool))
            .await
            .map_err(|e| StoreError::Internal(format!("failed ping: {}", e)))?;

        tracing::info!("Connected to database");
        Ok(pool)
    }

    /// Runs one query under the per-call timeout and translates its error.
    pub async fn run<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(map_sqlx_error),
            Err(_) => Err(StoreError::Internal(format!(
                "query timed out after {}ms",
                self.query_timeout.as_millis()
            ))),
        }
    }

    /// Closes the pool if it was ever opened.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            tracing::info!("Closing database connection pool...");
            pool.close().await;
            tracing::info!("Database connection pool closed");
        }
    }
}
