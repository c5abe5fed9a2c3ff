//! HTTP middleware for request processing.
//!
//! Provides anonymous identity and access logging.

pub mod identity;
pub mod tracing;
