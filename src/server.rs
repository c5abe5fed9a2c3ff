//! HTTP server initialization and runtime setup.
//!
//! Selects the storage backend, restores the snapshot, serves until a
//! shutdown signal and tears everything down in order.

use crate::application::services::{IdentityProvider, UrlService};
use crate::config::{Config, StorageKind};
use crate::domain::batch_pipeline::BatchPipeline;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::{
    KvStore, MemoryLinkRepository, PgConnector, PgLinkRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage chosen at startup, with what shutdown needs to tear it down.
struct Backend {
    repository: Arc<dyn LinkRepository>,
    snapshot: Option<(Arc<KvStore>, PathBuf)>,
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL pool is opened lazily on first use)
/// - Snapshot restore for the file-backed memory store
/// - Axum HTTP server with graceful shutdown
///
/// After the server drains, the snapshot is saved (failures are logged) and
/// the repository is closed.
///
/// # Errors
///
/// Returns an error if:
/// - The snapshot file exists but is malformed
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let backend = build_backend(&config)?;

    let url_service = Arc::new(UrlService::new(
        backend.repository.clone(),
        BatchPipeline::new(config.pipeline_config()),
    ));
    let identity = Arc::new(IdentityProvider::new(
        config.identity_secret.clone(),
        config.identity_ttl(),
        config.identity_cookie.clone(),
    ));

    let state = AppState::new(
        url_service.clone(),
        identity,
        &config.base_url,
        config.trusted_subnet,
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    tracing::info!("Server stopped, shutting down storage");

    if let Some((store, path)) = &backend.snapshot {
        save_snapshot(store, path);
    }
    url_service.close().await;

    tracing::info!("Shutdown complete");

    served.map_err(Into::into)
}

fn build_backend(config: &Config) -> Result<Backend> {
    match config.storage_kind() {
        StorageKind::Database => {
            let settings = config
                .pg_settings()
                .context("database storage selected without a DSN")?;
            let connector = Arc::new(PgConnector::new(settings));

            tracing::info!("Storage: PostgreSQL");
            Ok(Backend {
                repository: Arc::new(PgLinkRepository::new(connector)),
                snapshot: None,
            })
        }
        StorageKind::File => {
            let path = config
                .file_storage_path
                .clone()
                .context("file storage selected without a path")?;
            let store = Arc::new(KvStore::new());

            let loaded = store
                .load_from_file(&path)
                .with_context(|| format!("Failed to restore snapshot {}", path.display()))?;

            tracing::info!(entries = loaded, path = %path.display(), "Storage: memory with snapshot");
            Ok(Backend {
                repository: Arc::new(MemoryLinkRepository::new(store.clone())),
                snapshot: Some((store, path)),
            })
        }
        StorageKind::Memory => {
            tracing::info!("Storage: memory");
            Ok(Backend {
                repository: Arc::new(MemoryLinkRepository::new(Arc::new(KvStore::new()))),
                snapshot: None,
            })
        }
    }
}

fn save_snapshot(store: &KvStore, path: &Path) {
    match store.save_to_file(path) {
        Ok(saved) => tracing::info!(entries = saved, path = %path.display(), "Snapshot saved"),
        Err(e) => tracing::error!(error = %e, path = %path.display(), "Failed to save snapshot"),
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
