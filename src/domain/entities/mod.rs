//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`LinkRecord`] - A stored short link with owner and tombstone flag
//! - [`NewLink`] - Input for creating a record
//! - [`LinkStats`] - Aggregate counts over active links
//! - [`UserId`] - Anonymous owner identity

pub mod link;
pub mod user;

pub use link::{LinkRecord, LinkStats, NewLink};
pub use user::UserId;
