//! Utility functions for identifier generation, URL validation and error
//! translation.
//!
//! - [`short_id`] - Random short IDs and user IDs
//! - [`url_validation`] - Validation of submitted URLs
//! - [`db_error`] - `sqlx` error translation

pub mod db_error;
pub mod short_id;
pub mod url_validation;
