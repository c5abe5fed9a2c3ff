//! Cookie-based anonymous identity middleware.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};

use crate::domain::entities::UserId;
use crate::error::AppError;
use crate::state::AppState;

/// Owner identity of the current request, inserted by [`layer`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

/// Attaches an owner identity to every request.
///
/// # Cookie Format
///
/// ```text
/// Cookie: auth_token=<header>.<claims>.<signature>
/// ```
///
/// # Flow
///
/// 1. Extract the identity cookie (name from configuration)
/// 2. Verify signature and expiry via
///    [`crate::application::services::IdentityProvider::identify`]
/// 3. Insert [`CurrentUser`] into request extensions
/// 4. If a new identity was minted, append `Set-Cookie` to the response
///
/// A missing, forged or expired cookie never rejects the request; the client
/// silently receives a new identity.
///
/// # Errors
///
/// Returns `500 Internal Server Error` if a new identity cannot be generated.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookie_value(req.headers(), st.identity.cookie_name());
    let identity = st.identity.identify(token.as_deref())?;

    req.extensions_mut()
        .insert(CurrentUser(identity.user_id.clone()));

    let mut response = next.run(req).await;

    if let Some(token) = identity.issued_token {
        match HeaderValue::from_str(&st.identity.set_cookie_header(&token)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid identity cookie header"),
        }
    }

    Ok(response)
}

/// Handles multiple cookies in the `Cookie` header by splitting on
/// semicolons and picking the pair named `name`.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|cookie_header| cookie_header.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name && !value.is_empty() => {
                    Some(value.to_string())
                }
                _ => None,
            }
        })
}
