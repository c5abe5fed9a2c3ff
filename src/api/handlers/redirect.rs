//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short ID to its original URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the short ID doesn't exist.
/// Returns 410 Gone if the link was deleted by its owner.
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let original_url = state.url_service.resolve(&id).await?;

    tracing::debug!(id = %id, "Redirecting");

    Ok(Redirect::temporary(&original_url))
}
