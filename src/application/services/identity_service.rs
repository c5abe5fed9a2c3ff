//! Anonymous identity carried in a signed, expiring token.
//!
//! Tokens are HS256 JWTs with the claims `{"uid": "<user id>", "exp": <unix seconds>}`.
//! The signature covers both claims, so neither the user ID nor the expiry can
//! be altered without the server secret.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::entities::UserId;
use crate::domain::error::StoreError;
use crate::utils::short_id::generate_user_id;

pub const DEFAULT_COOKIE_NAME: &str = "auth_token";
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    uid: String,
    exp: i64,
}

/// Identity resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    /// Set when a new token was minted and must be sent back to the client.
    pub issued_token: Option<String>,
}

/// Issues and verifies identity tokens.
///
/// Both directions are pure functions of the secret, the TTL and the clock;
/// nothing is stored server-side.
#[derive(Clone)]
pub struct IdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    cookie_name: String,
}

impl IdentityProvider {
    pub fn new(secret: impl Into<String>, ttl: Duration, cookie_name: impl Into<String>) -> Self {
        let secret = secret.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `user_id` that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the token cannot be encoded.
    pub fn issue(&self, user_id: &UserId) -> Result<String, StoreError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Returns the embedded user ID if the signature matches and the token
    /// has not expired.
    pub fn verify(&self, token: &str) -> Option<UserId> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).ok()?;

        if data.claims.uid.is_empty() {
            return None;
        }

        Some(UserId::new(data.claims.uid))
    }

    /// Reuses the identity of a valid token or mints a new one.
    ///
    /// A missing, forged or expired token is replaced by a fresh random
    /// identity; the links of the previous identity stay with it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Generation`] if the random source fails while
    /// minting a new identity.
    pub fn identify(&self, token: Option<&str>) -> Result<Identity, StoreError> {
        if let Some(user_id) = token.and_then(|t| self.verify(t)) {
            return Ok(Identity {
                user_id,
                issued_token: None,
            });
        }

        let user_id = UserId::new(generate_user_id()?);
        let token = self.issue(&user_id)?;

        tracing::debug!(user_id = %user_id, "Issued new identity");

        Ok(Identity {
            user_id,
            issued_token: Some(token),
        })
    }

    /// Builds the `Set-Cookie` value that carries `token`.
    pub fn set_cookie_header(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly",
            self.cookie_name,
            token,
            self.ttl.as_secs()
        )
    }

    fn issue_at(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<String, StoreError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| StoreError::internal(format!("identity ttl out of range: {}", e)))?;
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| StoreError::internal("identity expiry out of range"))?
            .timestamp();

        let claims = Claims {
            uid: user_id.as_str().to_string(),
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| StoreError::internal(format!("failed to sign identity token: {}", e)))
    }
}
