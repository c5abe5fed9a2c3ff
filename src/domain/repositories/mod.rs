//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interface that abstracts link storage.
//! It is implemented by the in-memory and PostgreSQL backends in the
//! infrastructure layer.
//!
//! # Architecture
//!
//! - The trait defines the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod link_repository;

pub use link_repository::LinkRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
