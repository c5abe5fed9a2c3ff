//! Short ID and opaque identifier generation.
//!
//! Identifiers come straight from the OS random source and are rendered as
//! URL-safe base64. Uniqueness is enforced by the storage backend, not here.

use crate::domain::error::StoreError;
use base64::Engine as _;

/// Length of generated short IDs, in characters.
pub const SHORT_ID_LEN: usize = 8;

/// Number of random bytes behind a generated user ID.
pub const USER_ID_BYTES: usize = 16;

/// Generates a random URL-safe token of exactly `len` characters.
///
/// Reads `len` random bytes, encodes them as URL-safe base64 without padding
/// and truncates the result to `len` characters.
///
/// # Errors
///
/// Returns [`StoreError::Generation`] if the random source is unavailable.
/// The caller surfaces this as an internal error and does not retry.
///
/// # Examples
///
/// ```ignore
/// let id = generate_short_id(SHORT_ID_LEN)?;
/// assert_eq!(id.len(), 8);
/// ```
pub fn generate_short_id(len: usize) -> Result<String, StoreError> {
    let mut buffer = vec![0u8; len];
    fill_random(&mut buffer)?;

    let mut encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    encoded.truncate(len);
    Ok(encoded)
}

/// Generates a random opaque identifier for an anonymous client.
pub fn generate_user_id() -> Result<String, StoreError> {
    let mut buffer = [0u8; USER_ID_BYTES];
    fill_random(&mut buffer)?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

fn fill_random(buffer: &mut [u8]) -> Result<(), StoreError> {
    getrandom::fill(buffer).map_err(|e| StoreError::Generation(e.to_string()))
}
