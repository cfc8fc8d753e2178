//! FFmpeg CLI wrapper and frame archive packaging.
//!
//! This crate provides:
//! - Frame extraction from a source video
//! - Re-encoding a frame directory into a video at a given frame rate
//! - tar.gz packaging of a frame directory for transfer

pub mod archive;
pub mod command;
pub mod error;
pub mod frames;

pub use archive::archive_dir;
pub use command::{check_ffmpeg, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use frames::{encode_video, extract_frames};
