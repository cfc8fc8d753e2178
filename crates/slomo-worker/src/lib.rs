//! Slow-mo inference worker.
//!
//! This crate provides:
//! - The job orchestrator: submission plus bounded polling to a terminal
//!   outcome
//! - The pipeline driver wiring a storage event to frame preparation,
//!   inference, and result reconstruction
//! - Worker configuration and error types

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use orchestrator::JobOrchestrator;
pub use pipeline::Pipeline;
