//! End-to-end slow-mo pipeline.
//!
//! Thin glue around the orchestrator: stages the source video as a frame
//! archive the model can consume, waits for the inference output, then
//! rebuilds and uploads the slow-mo video. Only a `Completed` outcome
//! proceeds to reconstruction; every other outcome aborts with nothing
//! partial uploaded.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use slomo_inference::InferenceEndpoint;
use slomo_media::{archive_dir, encode_video, extract_frames};
use slomo_models::{
    InferenceOutput, InterpolationConfig, JobId, JobOutcome, JobRequest, S3Location, StorageEvent,
};
use slomo_storage::ObjectStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::orchestrator::JobOrchestrator;

/// Pipeline driver for one storage-event invocation.
pub struct Pipeline {
    config: WorkerConfig,
    store: Arc<dyn ObjectStore>,
    endpoint: Arc<dyn InferenceEndpoint>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Pipeline {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn ObjectStore>,
        endpoint: Arc<dyn InferenceEndpoint>,
    ) -> Self {
        Self {
            config,
            store,
            endpoint,
            cancel: None,
        }
    }

    /// Attach a cancellation signal, forwarded to the orchestrator's wait.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Process one storage event end to end.
    ///
    /// Returns the location of the uploaded slow-mo video.
    pub async fn run(&self, event: &StorageEvent) -> WorkerResult<S3Location> {
        let (source_bucket, source_key) = event.source()?;
        let stem = job_stem(&source_key).ok_or_else(|| {
            WorkerError::invalid_event(format!("object key has no file stem: {source_key}"))
        })?;
        let job_id = JobId::new();

        info!(
            job_id = %job_id,
            bucket = %source_bucket,
            key = %source_key,
            "Processing slow-mo request"
        );

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let workdir = tempfile::tempdir_in(&self.config.work_dir)?;

        // Stage the source video locally
        let source_path = workdir.path().join("source.mp4");
        self.store
            .download_file(&S3Location::new(&source_bucket, &source_key), &source_path)
            .await?;

        // Frames plus model parameters, packed for transfer
        let frames_dir = workdir.path().join("frames");
        let frame_count = extract_frames(&source_path, &frames_dir).await?;
        info!(job_id = %job_id, frames = frame_count, "Frames extracted");

        let model_config = InterpolationConfig::default();
        tokio::fs::write(
            frames_dir.join("config.json"),
            serde_json::to_vec_pretty(&model_config)?,
        )
        .await?;

        let archive_path = workdir.path().join(format!("{stem}.tar.gz"));
        archive_dir(&frames_dir, &archive_path)?;

        let input_location = S3Location::new(
            &self.config.model_bucket,
            format!("{}/{stem}.tar.gz", self.config.input_prefix),
        );
        self.store.upload_file(&archive_path, &input_location).await?;

        // Hand off to the orchestrator
        let request = JobRequest::new(
            input_location,
            self.config.job_timeout,
            self.config.poll_interval,
        )
        .with_timeout_hint(self.config.invocation_timeout);

        let mut orchestrator =
            JobOrchestrator::new(Arc::clone(&self.store), Arc::clone(&self.endpoint));
        if let Some(cancel) = &self.cancel {
            orchestrator = orchestrator.with_cancel(cancel.clone());
        }

        let output_location = match orchestrator.submit_and_wait(&request).await {
            JobOutcome::Completed { output_location } => output_location,
            JobOutcome::TimedOut { elapsed, deadline } => {
                return Err(WorkerError::job_failed(format!(
                    "model did not complete within {deadline:?} (waited {elapsed:?}); \
                     check the endpoint logs"
                )));
            }
            JobOutcome::Failed { reason } => {
                return Err(WorkerError::job_failed(format!(
                    "submission rejected: {reason}"
                )));
            }
            JobOutcome::Cancelled { elapsed } => {
                return Err(WorkerError::job_failed(format!(
                    "cancelled after {elapsed:?}"
                )));
            }
        };

        // Materialize the result: the output object is a manifest naming
        // the prefix that holds the interpolated frames
        let manifest_path = workdir.path().join("output.json");
        self.store.download_file(&output_location, &manifest_path).await?;
        let manifest: InferenceOutput =
            serde_json::from_slice(&tokio::fs::read(&manifest_path).await?)?;

        let result_frames = workdir.path().join("slow_mo_frames");
        self.store
            .sync_prefix(&manifest.output_location, &result_frames)
            .await?;

        let output_video = workdir.path().join(format!("{stem}.mp4"));
        encode_video(&result_frames, &output_video, self.config.output_fps).await?;

        let result_location = S3Location::new(
            &self.config.model_bucket,
            format!("{}/{stem}.mp4", self.config.result_prefix),
        );
        self.store.upload_file(&output_video, &result_location).await?;

        info!(job_id = %job_id, result = %result_location, "Slow-mo video uploaded");
        Ok(result_location)
    }
}

/// File stem of the triggering object's key.
fn job_stem(key: &str) -> Option<&str> {
    Path::new(key).file_stem().and_then(|s| s.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_stem() {
        assert_eq!(job_stem("videos/my clip (1).mp4"), Some("my clip (1)"));
        assert_eq!(job_stem("clip.mp4"), Some("clip"));
        assert_eq!(job_stem("videos/clip"), Some("clip"));
        assert_eq!(job_stem(""), None);
    }
}
