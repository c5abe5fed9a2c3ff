//! API route configuration.
//!
//! Every route sees the [`crate::api::middleware::identity::CurrentUser`] of
//! the request; ownership is scoped by it.

use crate::api::handlers::{
    delete_user_urls_handler, internal_stats_handler, list_user_urls_handler,
    shorten_batch_handler, shorten_json_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`         - Shorten one URL (JSON envelope)
/// - `POST   /shorten/batch`   - Shorten many URLs with correlation IDs
/// - `GET    /user/urls`       - List the current identity's links
/// - `DELETE /user/urls`       - Soft-delete links of the current identity
/// - `GET    /internal/stats`  - Link and owner counts (trusted subnet only)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_json_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route(
            "/user/urls",
            get(list_user_urls_handler).delete(delete_user_urls_handler),
        )
        .route("/internal/stats", get(internal_stats_handler))
}
