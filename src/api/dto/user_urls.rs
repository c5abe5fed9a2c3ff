//! DTOs for the per-user link endpoints.

use serde::{Deserialize, Serialize};

/// A link owned by the current user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserUrlItem {
    pub short_url: String,
    pub original_url: String,
}
