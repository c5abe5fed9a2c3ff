//! Application layer services implementing business logic.
//!
//! Services consume the repository trait and provide a clean API for HTTP
//! handlers.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Shortening, resolution, listing and deletion
//! - [`services::identity_service::IdentityProvider`] - Anonymous signed-token identity

pub mod services;
