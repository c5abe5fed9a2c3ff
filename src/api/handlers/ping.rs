//! Handler for storage connectivity check.

use axum::{extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

/// Reports whether the storage backend answers.
///
/// # Endpoint
///
/// `GET /ping`
///
/// Always `200 OK` on the in-memory backend. On PostgreSQL, the first call
/// also opens the connection pool.
pub async fn ping_handler(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.url_service.ping().await?;
    Ok(StatusCode::OK)
}
