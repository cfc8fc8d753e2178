//! Inference job orchestration.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use slomo_inference::InferenceEndpoint;
use slomo_models::{JobOutcome, JobRequest};
use slomo_storage::ObjectStore;

/// Drives one inference job from submission to a terminal outcome.
///
/// The caller never manages timing or polling: submission strictly precedes
/// all polls, polls are strictly sequential, and exactly one [`JobOutcome`]
/// comes back. Completion is inferred purely from the appearance of the
/// handle's output artifact; the endpoint exposes no status API. That means
/// a remote job that dies without writing its output is indistinguishable
/// from one still running, and only surfaces as `TimedOut` after the full
/// window elapses.
///
/// Instances hold no mutable state between calls and are safe to run
/// concurrently against shared, thread-safe collaborators.
pub struct JobOrchestrator {
    store: Arc<dyn ObjectStore>,
    endpoint: Arc<dyn InferenceEndpoint>,
    cancel: Option<watch::Receiver<bool>>,
}

impl JobOrchestrator {
    /// Create an orchestrator over injected collaborators.
    pub fn new(store: Arc<dyn ObjectStore>, endpoint: Arc<dyn InferenceEndpoint>) -> Self {
        Self {
            store,
            endpoint,
            cancel: None,
        }
    }

    /// Attach an external cancellation signal, raced against the inter-poll
    /// sleep. A raised signal yields `JobOutcome::Cancelled`.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Submit the job and wait for its output artifact.
    ///
    /// Every expected condition (rejected submission, deadline elapsed,
    /// cancellation) is a [`JobOutcome`] variant, never an error: callers
    /// always get a definitive answer.
    pub async fn submit_and_wait(&self, request: &JobRequest) -> JobOutcome {
        let handle = match self
            .endpoint
            .submit_async(&request.input_location, request.timeout_hint)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(input = %request.input_location, error = %e, "Job submission failed");
                return JobOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        info!(
            inference_id = %handle.inference_id,
            output = %handle.output_location,
            timeout = ?request.timeout,
            poll_interval = ?request.poll_interval,
            "Job submitted, waiting for output artifact"
        );

        let started = Instant::now();
        let deadline = started + request.timeout;
        let mut cancel = self.cancel.clone();
        let mut polls = 0u32;

        loop {
            if let Some(rx) = cancel.as_mut() {
                tokio::select! {
                    _ = sleep(request.poll_interval) => {}
                    changed = rx.changed() => {
                        match changed {
                            Ok(()) if *rx.borrow() => {
                                info!(inference_id = %handle.inference_id, "Wait cancelled");
                                return JobOutcome::Cancelled {
                                    elapsed: started.elapsed(),
                                };
                            }
                            // Signal lowered again: keep waiting
                            Ok(()) => continue,
                            // Sender gone: cancellation can no longer occur
                            Err(_) => {
                                cancel = None;
                                continue;
                            }
                        }
                    }
                }
            } else {
                sleep(request.poll_interval).await;
            }

            polls += 1;
            match self.store.exists(&handle.output_location).await {
                Ok(true) => {
                    info!(inference_id = %handle.inference_id, polls, "Output artifact present");
                    return JobOutcome::Completed {
                        output_location: handle.output_location.clone(),
                    };
                }
                Ok(false) => {
                    debug!(inference_id = %handle.inference_id, polls, "Output not present yet");
                }
                Err(e) => {
                    // A transport blip is indistinguishable from "still
                    // computing" without a status API; stay in the loop
                    // and let the deadline decide.
                    warn!(
                        inference_id = %handle.inference_id,
                        polls,
                        error = %e,
                        "Existence check failed, retrying at next poll"
                    );
                }
            }

            if Instant::now() >= deadline {
                let elapsed = started.elapsed();
                warn!(
                    inference_id = %handle.inference_id,
                    ?elapsed,
                    polls,
                    "Deadline elapsed without completion"
                );
                return JobOutcome::TimedOut {
                    elapsed,
                    deadline: request.timeout,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use slomo_inference::{InferenceError, InferenceResult};
    use slomo_models::{JobHandle, S3Location};
    use slomo_storage::{StorageError, StorageResult};

    const OUTPUT_KEY: &str = "async-output/abc123/response.json";

    /// Stable store double: the output appears at a fixed poll number (or
    /// never), optionally after some leading transport failures, and the
    /// answer never flaps afterwards.
    struct FakeStore {
        polls: AtomicUsize,
        appear_at: Option<usize>,
        transport_failures: usize,
    }

    impl FakeStore {
        fn never() -> Arc<Self> {
            Arc::new(Self {
                polls: AtomicUsize::new(0),
                appear_at: None,
                transport_failures: 0,
            })
        }

        fn appearing_at(poll: usize) -> Arc<Self> {
            Arc::new(Self {
                polls: AtomicUsize::new(0),
                appear_at: Some(poll),
                transport_failures: 0,
            })
        }

        fn flaky(transport_failures: usize, appear_at: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                polls: AtomicUsize::new(0),
                appear_at,
                transport_failures,
            })
        }

        fn poll_count(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn exists(&self, _location: &S3Location) -> StorageResult<bool> {
            let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if poll <= self.transport_failures {
                return Err(StorageError::transport("connection reset"));
            }
            Ok(self.appear_at.is_some_and(|n| poll >= n))
        }

        async fn upload_file(&self, _path: &Path, _location: &S3Location) -> StorageResult<()> {
            unreachable!("orchestrator only performs existence checks")
        }

        async fn download_file(&self, _location: &S3Location, _path: &Path) -> StorageResult<()> {
            unreachable!("orchestrator only performs existence checks")
        }

        async fn sync_prefix(&self, _prefix: &S3Location, _dir: &Path) -> StorageResult<()> {
            unreachable!("orchestrator only performs existence checks")
        }
    }

    struct FakeEndpoint {
        reject: Option<String>,
        submissions: AtomicUsize,
    }

    impl FakeEndpoint {
        fn accepting() -> Arc<Self> {
            Arc::new(Self {
                reject: None,
                submissions: AtomicUsize::new(0),
            })
        }

        fn rejecting(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                reject: Some(reason.to_string()),
                submissions: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl InferenceEndpoint for FakeEndpoint {
        async fn submit_async(
            &self,
            _input: &S3Location,
            _timeout_hint: Duration,
        ) -> InferenceResult<JobHandle> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            if let Some(reason) = &self.reject {
                return Err(InferenceError::Rejected(reason.clone()));
            }
            Ok(JobHandle {
                output_location: S3Location::new("models-bucket", OUTPUT_KEY),
                inference_id: "abc123".to_string(),
                submitted_at: Utc::now(),
            })
        }
    }

    fn request(timeout_secs: u64, interval_secs: u64) -> JobRequest {
        JobRequest::new(
            S3Location::new("models-bucket", "slow-mo/input/clip.tar.gz"),
            Duration::from_secs(timeout_secs),
            Duration::from_secs(interval_secs),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_when_output_appears() {
        let store = FakeStore::appearing_at(2);
        let orchestrator = JobOrchestrator::new(store.clone(), FakeEndpoint::accepting());

        let started = Instant::now();
        let outcome = orchestrator.submit_and_wait(&request(60, 20)).await;

        assert_eq!(
            outcome,
            JobOutcome::Completed {
                output_location: S3Location::new("models-bucket", OUTPUT_KEY),
            }
        );
        assert_eq!(store.poll_count(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_present_at_first_poll() {
        let store = FakeStore::appearing_at(1);
        let orchestrator = JobOrchestrator::new(store.clone(), FakeEndpoint::accepting());

        let started = Instant::now();
        let outcome = orchestrator.submit_and_wait(&request(60, 20)).await;

        assert!(outcome.is_completed());
        assert_eq!(store.poll_count(), 1);
        // No busy-polling: exactly one poll_interval of waiting
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_output_never_appears() {
        let store = FakeStore::never();
        let orchestrator = JobOrchestrator::new(store.clone(), FakeEndpoint::accepting());

        let timeout = Duration::from_secs(40);
        let poll_interval = Duration::from_secs(20);
        let outcome = orchestrator.submit_and_wait(&request(40, 20)).await;

        match outcome {
            JobOutcome::TimedOut { elapsed, deadline } => {
                assert_eq!(deadline, timeout);
                assert!(elapsed >= timeout);
                assert!(elapsed < timeout + poll_interval);
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert_eq!(store.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_submission_performs_no_polls() {
        let store = FakeStore::never();
        let endpoint = FakeEndpoint::rejecting("auth error: missing credentials");
        let orchestrator = JobOrchestrator::new(store.clone(), endpoint.clone());

        let started = Instant::now();
        let outcome = orchestrator.submit_and_wait(&request(60, 20)).await;

        match outcome {
            JobOutcome::Failed { reason } => assert!(reason.contains("auth error")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(store.poll_count(), 0);
        assert_eq!(endpoint.submissions.load(Ordering::SeqCst), 1);
        // Failure is immediate, no waiting at all
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_poll_error_does_not_abort() {
        // First check fails on transport, output appears at the third
        let store = FakeStore::flaky(1, Some(3));
        let orchestrator = JobOrchestrator::new(store.clone(), FakeEndpoint::accepting());

        let outcome = orchestrator.submit_and_wait(&request(120, 20)).await;

        assert!(outcome.is_completed());
        assert_eq!(store.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_poll_errors_surface_as_timeout() {
        let store = FakeStore::flaky(usize::MAX, None);
        let orchestrator = JobOrchestrator::new(store.clone(), FakeEndpoint::accepting());

        let outcome = orchestrator.submit_and_wait(&request(40, 20)).await;

        assert!(matches!(outcome, JobOutcome::TimedOut { .. }));
        assert_eq!(store.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_mid_wait() {
        let store = FakeStore::never();
        let (tx, rx) = watch::channel(false);
        let orchestrator =
            JobOrchestrator::new(store.clone(), FakeEndpoint::accepting()).with_cancel(rx);

        let wait = tokio::spawn(async move {
            orchestrator.submit_and_wait(&request(600, 20)).await
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        tx.send(true).unwrap();

        match wait.await.unwrap() {
            JobOutcome::Cancelled { elapsed } => {
                assert!(elapsed < Duration::from_secs(20));
            }
            other => panic!("expected Cancelled, got {other:?}"),
        }
        assert_eq!(store.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_jobs_do_not_interfere() {
        let fast_store = FakeStore::appearing_at(1);
        let slow_store = FakeStore::never();
        let endpoint = FakeEndpoint::accepting();

        let fast = JobOrchestrator::new(fast_store.clone(), endpoint.clone());
        let slow = JobOrchestrator::new(slow_store.clone(), endpoint);

        let fast_request = request(60, 20);
        let slow_request = request(40, 20);
        let (a, b) = tokio::join!(
            fast.submit_and_wait(&fast_request),
            slow.submit_and_wait(&slow_request),
        );

        assert!(a.is_completed());
        assert!(matches!(b, JobOutcome::TimedOut { .. }));
        assert_eq!(fast_store.poll_count(), 1);
        assert_eq!(slow_store.poll_count(), 2);
    }

    #[tokio::test]
    async fn test_stable_store_reports_consistently() {
        let store = FakeStore::never();
        let location = S3Location::new("models-bucket", OUTPUT_KEY);

        for _ in 0..3 {
            assert!(!store.exists(&location).await.unwrap());
        }
    }
}
