//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Model error: {0}")]
    Model(#[from] slomo_models::ModelError),

    #[error("Storage error: {0}")]
    Storage(#[from] slomo_storage::StorageError),

    #[error("Inference error: {0}")]
    Inference(#[from] slomo_inference::InferenceError),

    #[error("Media error: {0}")]
    Media(#[from] slomo_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Self::InvalidEvent(msg.into())
    }
}
