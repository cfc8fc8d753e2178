//! S3 object store gateway.
//!
//! This crate provides:
//! - The [`ObjectStore`] trait consumed by the orchestrator and pipeline
//! - An AWS S3 implementation (works against any S3-compatible endpoint)
//! - Existence checks that distinguish absence from transport failure

pub mod client;
pub mod error;
pub mod store;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use store::ObjectStore;
