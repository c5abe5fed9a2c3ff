//! Storage backends for the link repository.
//!
//! # Backends
//!
//! - [`MemoryLinkRepository`] - Process-local store over [`KvStore`], optionally
//!   persisted to a JSON snapshot file
//! - [`PgLinkRepository`] - PostgreSQL store over a lazily opened [`PgConnector`]

pub mod kv_store;
pub mod memory_link_repository;
pub mod pg_connector;
pub mod pg_link_repository;

pub use kv_store::KvStore;
pub use memory_link_repository::MemoryLinkRepository;
pub use pg_connector::{PgConnector, PgSettings};
pub use pg_link_repository::PgLinkRepository;
