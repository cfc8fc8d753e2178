//! Frame-interpolation model parameters and output manifest.

use serde::{Deserialize, Serialize};

use crate::location::S3Location;

/// Parameters shipped to the interpolation model alongside the frames,
/// written as `config.json` at the root of the input archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    /// Input padding alignment, in pixels.
    pub align: u32,
    /// Vertical tiling of the input frames.
    pub block_height: u32,
    /// Horizontal tiling of the input frames.
    pub block_width: u32,
    /// Recursion depth: each level doubles the number of in-between frames.
    pub time_to_interpolate: u32,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            align: 64,
            block_height: 1,
            block_width: 1,
            time_to_interpolate: 2,
        }
    }
}

/// Manifest the endpoint writes to the job's output location on success.
///
/// `output_location` names the prefix holding the interpolated frames; the
/// pipeline syncs that prefix locally to rebuild the video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOutput {
    pub output_location: S3Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = InterpolationConfig::default();
        assert_eq!(config.align, 64);
        assert_eq!(config.block_height, 1);
        assert_eq!(config.block_width, 1);
        assert_eq!(config.time_to_interpolate, 2);
    }

    #[test]
    fn test_manifest_parses_uri() {
        let manifest: InferenceOutput = serde_json::from_str(
            r#"{"output_location":"s3://models-bucket/slow-mo/frames/clip"}"#,
        )
        .unwrap();

        assert_eq!(manifest.output_location.bucket(), "models-bucket");
        assert_eq!(manifest.output_location.key(), "slow-mo/frames/clip");
    }
}
