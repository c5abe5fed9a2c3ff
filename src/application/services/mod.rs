//! Business logic services for the application layer.

pub mod identity_service;
pub mod url_service;

pub use identity_service::{Identity, IdentityProvider};
pub use url_service::{BatchDeleteReport, Shortened, UrlService};
