//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`        - Shorten a plain-text URL
//! - `GET  /{id}`    - Short link redirect
//! - `GET  /ping`    - Storage connectivity check
//! - `/api/*`        - JSON API (see [`crate::api::routes`])
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Gzip** - Response compression and request decompression
//! - **Identity** - Signed cookie carrying the anonymous owner ID
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{ping_handler, redirect_handler, shorten_text_handler};
use crate::api::middleware::{identity, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// All routes with every middleware except path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/ping", get(ping_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api::routes::routes())
        .layer(middleware::from_fn_with_state(state.clone(), identity::layer))
        .with_state(state)
        .layer(RequestDecompressionLayer::new())
        .layer(CompressionLayer::new())
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// Trailing slashes are trimmed before routing, so `/api/user/urls/` and
/// `/api/user/urls` are the same route.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
