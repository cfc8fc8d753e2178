//! tar.gz packaging of a frame directory.

use std::fs::File;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::Builder;
use tracing::info;

use crate::error::{MediaError, MediaResult};

/// Pack the files of `dir` into a gzip-compressed tar at `archive_path`.
///
/// Entries are added flat, named by their file name: the interpolation
/// model expects the frames and `config.json` at the archive root.
pub fn archive_dir(dir: &Path, archive_path: &Path) -> MediaResult<()> {
    if !dir.is_dir() {
        return Err(MediaError::FileNotFound(dir.to_path_buf()));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|e| e.path().is_file())
        .collect();
    // Deterministic archive layout
    entries.sort_by_key(|e| e.file_name());

    if entries.is_empty() {
        return Err(MediaError::EmptyFrameDir(dir.to_path_buf()));
    }

    let file = File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    for entry in &entries {
        builder
            .append_path_with_name(entry.path(), entry.file_name())
            .map_err(|e| MediaError::archive_failed(e.to_string()))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| MediaError::archive_failed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| MediaError::archive_failed(e.to_string()))?;

    info!(
        "Packed {} files from {} into {}",
        entries.len(),
        dir.display(),
        archive_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use tar::Archive;
    use tempfile::TempDir;

    #[test]
    fn test_archive_is_flat_and_complete() {
        let dir = TempDir::new().unwrap();
        let frames = dir.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        std::fs::write(frames.join("00001.png"), b"frame1").unwrap();
        std::fs::write(frames.join("00002.png"), b"frame2").unwrap();
        std::fs::write(frames.join("config.json"), b"{}").unwrap();

        let archive_path = dir.path().join("frames.tar.gz");
        archive_dir(&frames, &archive_path).unwrap();

        let mut archive = Archive::new(GzDecoder::new(File::open(&archive_path).unwrap()));
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["00001.png", "00002.png", "config.json"]);
    }

    #[test]
    fn test_empty_dir_rejected() {
        let dir = TempDir::new().unwrap();
        let err = archive_dir(dir.path(), &dir.path().join("out.tar.gz")).unwrap_err();
        assert!(matches!(err, MediaError::EmptyFrameDir(_)));
    }

    #[test]
    fn test_missing_dir_rejected() {
        let dir = TempDir::new().unwrap();
        let err = archive_dir(&dir.path().join("nope"), &dir.path().join("out.tar.gz"))
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
