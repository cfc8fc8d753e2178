//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bucket the model reads inputs from and writes results to
    pub model_bucket: String,
    /// Key prefix for prepared input archives
    pub input_prefix: String,
    /// Key prefix for finished slow-mo videos
    pub result_prefix: String,
    /// Pause between output existence checks
    pub poll_interval: Duration,
    /// Maximum wall-clock wait for the inference output
    pub job_timeout: Duration,
    /// Invocation timeout hint forwarded to the endpoint
    pub invocation_timeout: Duration,
    /// Frame rate of the reconstructed video
    pub output_fps: u32,
    /// Work directory for per-invocation scratch space
    pub work_dir: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            model_bucket: "slomo-models".to_string(),
            input_prefix: "slow-mo/input".to_string(),
            result_prefix: "slow-mo/result".to_string(),
            poll_interval: Duration::from_secs(20),
            job_timeout: Duration::from_secs(60 * 25),
            invocation_timeout: Duration::from_secs(3600),
            output_fps: 25,
            work_dir: "/tmp/slomo".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            model_bucket: std::env::var("SLOMO_MODEL_BUCKET")
                .unwrap_or_else(|_| "slomo-models".to_string()),
            input_prefix: std::env::var("SLOMO_INPUT_PREFIX")
                .unwrap_or_else(|_| "slow-mo/input".to_string()),
            result_prefix: std::env::var("SLOMO_RESULT_PREFIX")
                .unwrap_or_else(|_| "slow-mo/result".to_string()),
            poll_interval: Duration::from_secs(
                std::env::var("SLOMO_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
            job_timeout: Duration::from_secs(
                std::env::var("SLOMO_JOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60 * 25),
            ),
            invocation_timeout: Duration::from_secs(
                std::env::var("SLOMO_INVOCATION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            output_fps: std::env::var("SLOMO_OUTPUT_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(25),
            work_dir: std::env::var("SLOMO_WORK_DIR").unwrap_or_else(|_| "/tmp/slomo".to_string()),
        }
    }
}
