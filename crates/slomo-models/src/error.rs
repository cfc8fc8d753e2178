//! Model error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid object location: {0}")]
    InvalidLocation(String),

    #[error("Invalid storage event: {0}")]
    InvalidEvent(String),
}

impl ModelError {
    pub fn invalid_location(msg: impl Into<String>) -> Self {
        Self::InvalidLocation(msg.into())
    }

    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Self::InvalidEvent(msg.into())
    }
}
