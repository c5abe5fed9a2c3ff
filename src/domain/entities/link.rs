//! Link entity representing a shortened URL mapping.

use serde::{Deserialize, Serialize};

/// A stored short link with its owner and tombstone flag.
///
/// Records are created once and only ever mutated by setting `deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub short_id: String,
    pub original_url: String,
    pub owner_id: String,
    pub deleted: bool,
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub short_id: String,
    pub original_url: String,
    pub owner_id: String,
}

impl NewLink {
    pub fn new(
        short_id: impl Into<String>,
        original_url: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            short_id: short_id.into(),
            original_url: original_url.into(),
            owner_id: owner_id.into(),
        }
    }
}

/// Aggregate counts over non-deleted links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub urls: i64,
    pub users: i64,
}
