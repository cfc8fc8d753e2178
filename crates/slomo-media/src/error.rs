//! Media error types.

use std::path::PathBuf;

use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg failed (exit code {code:?}): {stderr}")]
    FfmpegFailed { stderr: String, code: Option<i32> },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Empty frame directory: {0}")]
    EmptyFrameDir(PathBuf),

    #[error("Archive failed: {0}")]
    ArchiveFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn ffmpeg_failed(stderr: impl Into<String>, code: Option<i32>) -> Self {
        Self::FfmpegFailed {
            stderr: stderr.into(),
            code,
        }
    }

    pub fn archive_failed(msg: impl Into<String>) -> Self {
        Self::ArchiveFailed(msg.into())
    }
}
