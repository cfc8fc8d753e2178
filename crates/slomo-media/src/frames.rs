//! Frame extraction and video reconstruction.

use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Frame file pattern used in both directions. The interpolation model
/// consumes and produces zero-padded PNG sequences.
const FRAME_PATTERN: &str = "%05d.png";

/// Extract every frame of `video` into `frames_dir` as a PNG sequence.
///
/// Returns the number of frames written.
pub async fn extract_frames(video: &Path, frames_dir: &Path) -> MediaResult<usize> {
    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    fs::create_dir_all(frames_dir).await?;

    FfmpegCommand::new(video, frames_dir.join(FRAME_PATTERN))
        .run()
        .await?;

    let count = count_frames(frames_dir).await?;
    if count == 0 {
        return Err(MediaError::EmptyFrameDir(frames_dir.to_path_buf()));
    }

    info!("Extracted {} frames from {}", count, video.display());
    Ok(count)
}

/// Re-encode the PNG sequence in `frames_dir` into an H.264 video at `fps`.
pub async fn encode_video(frames_dir: &Path, output: &Path, fps: u32) -> MediaResult<()> {
    let count = count_frames(frames_dir).await?;
    if count == 0 {
        return Err(MediaError::EmptyFrameDir(frames_dir.to_path_buf()));
    }

    FfmpegCommand::new(frames_dir.join(FRAME_PATTERN), output)
        .framerate(fps)
        .video_codec("libx264")
        .pixel_format("yuv420p")
        .run()
        .await?;

    info!(
        "Encoded {} frames into {} at {} fps",
        count,
        output.display(),
        fps
    );
    Ok(())
}

async fn count_frames(dir: &Path) -> MediaResult<usize> {
    let mut entries = fs::read_dir(dir).await?;
    let mut count = 0usize;

    while let Some(entry) = entries.next_entry().await? {
        if entry.path().extension().is_some_and(|ext| ext == "png") {
            count += 1;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extract_missing_video_rejected() {
        let dir = TempDir::new().unwrap();
        let err = extract_frames(&dir.path().join("missing.mp4"), &dir.path().join("frames"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_encode_empty_dir_rejected() {
        let dir = TempDir::new().unwrap();
        let err = encode_video(dir.path(), &dir.path().join("out.mp4"), 25)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EmptyFrameDir(_)));
    }

    /// Full extract/encode cycle against a generated test pattern.
    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_extract_then_encode() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("source.mp4");

        // Generate a short test clip
        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-y", "-v", "error", "-f", "lavfi", "-i", "testsrc=duration=1:size=128x128:rate=10",
            ])
            .arg(&video)
            .status()
            .await
            .unwrap();
        assert!(status.success());

        let frames_dir = dir.path().join("frames");
        let count = extract_frames(&video, &frames_dir).await.unwrap();
        assert_eq!(count, 10);

        let output = dir.path().join("out.mp4");
        encode_video(&frames_dir, &output, 25).await.unwrap();
        assert!(output.exists());
    }
}
