//! Handlers for link shortening endpoints.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{
    BatchShortenItem, BatchShortenResult, ShortenRequest, ShortenResponse,
};
use crate::api::middleware::identity::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validation::validate_original_url;

/// Shortens a URL sent as plain text.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response Codes
///
/// - **201 Created**: `text/plain` short link
/// - **409 Conflict**: the URL was already shortened; the body carries the
///   existing short link, as `{"result": ...}` when the client accepts JSON
/// - **400 Bad Request**: empty body or not an http(s) URL
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, AppError> {
    let original_url = validate_original_url(&body)?;

    let shortened = state
        .url_service
        .shorten(&original_url, user.as_str())
        .await?;
    let short_url = state.short_url(&shortened.id);

    if shortened.created {
        return Ok((
            StatusCode::CREATED,
            [(header::CONTENT_TYPE, "text/plain")],
            short_url,
        )
            .into_response());
    }

    if accepts_json(&headers) {
        Ok((
            StatusCode::CONFLICT,
            Json(ShortenResponse { result: short_url }),
        )
            .into_response())
    } else {
        Ok((
            StatusCode::CONFLICT,
            [(header::CONTENT_TYPE, "text/plain")],
            short_url,
        )
            .into_response())
    }
}

/// Shortens a URL sent in a JSON envelope.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// `201 Created` with `{"result": "<short link>"}`, or `409 Conflict` with
/// the existing short link in the same shape.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(invalid_json)?;
    payload.validate()?;

    let original_url = validate_original_url(&payload.url)?;

    let shortened = state
        .url_service
        .shorten(&original_url, user.as_str())
        .await?;

    let status = if shortened.created {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };

    Ok((
        status,
        Json(ShortenResponse {
            result: state.short_url(&shortened.id),
        }),
    ))
}

/// Shortens many URLs at once.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [{ "correlation_id": "1", "original_url": "https://example.com" }]
/// ```
///
/// Items are processed independently. Invalid URLs and items that fail in
/// storage are skipped and logged; already shortened URLs are answered with
/// their existing short link.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<Vec<BatchShortenItem>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<BatchShortenResult>>), AppError> {
    let Json(items) = payload.map_err(invalid_json)?;

    let mut results = Vec::with_capacity(items.len());

    for item in items {
        let original_url = match validate_original_url(&item.original_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(correlation_id = %item.correlation_id, error = %e, "Skipping invalid URL");
                continue;
            }
        };

        match state.url_service.shorten(&original_url, user.as_str()).await {
            Ok(shortened) => results.push(BatchShortenResult {
                correlation_id: item.correlation_id,
                short_url: state.short_url(&shortened.id),
            }),
            Err(e) => {
                tracing::warn!(correlation_id = %item.correlation_id, error = %e, "Failed to shorten batch item");
            }
        }
    }

    Ok((StatusCode::CREATED, Json(results)))
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

pub(crate) fn invalid_json(rejection: JsonRejection) -> AppError {
    AppError::bad_request(
        "Invalid JSON payload",
        json!({ "reason": rejection.body_text() }),
    )
}
