//! Handlers for the current user's links.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::user_urls::UserUrlItem;
use crate::api::handlers::shorten::invalid_json;
use crate::api::middleware::identity::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists links created by the current identity.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response Codes
///
/// - **200 OK**: `[{"short_url": ..., "original_url": ...}]`
/// - **204 No Content**: the identity owns no active links
pub async fn list_user_urls_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let records = state.url_service.list_by_owner(user.as_str()).await?;

    if records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<UserUrlItem> = records
        .into_iter()
        .map(|record| UserUrlItem {
            short_url: state.short_url(&record.short_id),
            original_url: record.original_url,
        })
        .collect();

    Ok(Json(items).into_response())
}

/// Soft-deletes links of the current identity.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["abc12345", "def67890"]
/// ```
///
/// IDs owned by other identities are ignored. Deleted links answer
/// `410 Gone` afterwards.
///
/// # Response Codes
///
/// - **202 Accepted**: every batch was applied
/// - **400 Bad Request**: body is not a non-empty JSON array of strings
/// - **500 Internal Server Error**: storage unreachable or some batches failed
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(ids) = payload.map_err(invalid_json)?;

    if ids.is_empty() {
        return Err(AppError::bad_request(
            "At least one short ID is required",
            json!({}),
        ));
    }

    let report = state.url_service.batch_delete(ids, user.as_str()).await?;

    if !report.is_complete() {
        tracing::error!(
            requested = report.requested,
            failed = report.failed_items,
            "Batch delete partially failed"
        );
        return Err(AppError::internal(
            "Some links could not be deleted",
            json!({ "failed": report.failed_items, "requested": report.requested }),
        ));
    }

    Ok(StatusCode::ACCEPTED)
}
