//! Shared application state.

use std::net::IpAddr;
use std::sync::Arc;

use sqlx::types::ipnetwork::IpNetwork;

use crate::application::services::{IdentityProvider, UrlService};

/// State injected into every handler.
///
/// Cheap to clone; the services are shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub identity: Arc<IdentityProvider>,
    /// Base URL without trailing slash, e.g. `http://localhost:8080`.
    pub base_url: Arc<str>,
    pub trusted_subnet: Option<IpNetwork>,
}

impl AppState {
    pub fn new(
        url_service: Arc<UrlService>,
        identity: Arc<IdentityProvider>,
        base_url: &str,
        trusted_subnet: Option<IpNetwork>,
    ) -> Self {
        Self {
            url_service,
            identity,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            trusted_subnet,
        }
    }

    /// Builds the public short link for `short_id`.
    pub fn short_url(&self, short_id: &str) -> String {
        format!("{}/{}", self.base_url, short_id)
    }

    /// Returns true if `ip` belongs to the trusted subnet. Always false when
    /// no subnet is configured.
    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        self.trusted_subnet.is_some_and(|net| net.contains(ip))
    }
}
