//! Handler for internal service statistics.

use std::net::IpAddr;

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::json;

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

const REAL_IP_HEADER: &str = "x-real-ip";

/// Returns the number of active links and of distinct owners.
///
/// # Endpoint
///
/// `GET /api/internal/stats`
///
/// # Access
///
/// Only clients whose `X-Real-IP` header belongs to the configured trusted
/// subnet are served. Without a configured subnet the endpoint always
/// answers `403 Forbidden`.
///
/// # Response
///
/// ```json
/// { "urls": 42, "users": 7 }
/// ```
pub async fn internal_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    let client_ip = headers
        .get(REAL_IP_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    match client_ip {
        Some(ip) if state.is_trusted(ip) => {}
        _ => {
            return Err(AppError::forbidden(
                "Access denied",
                json!({ "reason": "client is not in the trusted subnet" }),
            ));
        }
    }

    let stats = state.url_service.stats().await?;

    Ok(Json(stats.into()))
}
