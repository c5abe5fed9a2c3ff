//! DTO for internal service statistics.

use serde::{Deserialize, Serialize};

use crate::domain::entities::LinkStats;

/// Counts over non-deleted links.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub urls: i64,
    pub users: i64,
}

impl From<LinkStats> for StatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            urls: stats.urls,
            users: stats.users,
        }
    }
}
