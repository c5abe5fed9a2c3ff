//! Domain layer containing business entities and logic.
//!
//! Defines entities, the repository interface, the storage error taxonomy and
//! the batch worker pool, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`error`] - Storage error taxonomy
//! - [`batch_pipeline`] - Bounded fan-out/fan-in worker pool
//!
//! # Batch Delete Flow
//!
//! 1. HTTP handler receives a list of short IDs
//! 2. [`crate::application::services::UrlService::batch_delete`] checks the backend
//! 3. [`batch_pipeline::BatchPipeline`] spreads the IDs over workers in batches
//! 4. Each batch is applied via [`repositories::LinkRepository::soft_delete`]

pub mod batch_pipeline;
pub mod entities;
pub mod error;
pub mod repositories;
