//! Inference job types.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::location::S3Location;

/// Timeout hint passed to the endpoint at submission time. Matches the
/// longest invocation the remote service will accept before dropping the
/// job on its side; independent of how long the orchestrator itself waits.
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Unique identifier for one pipeline invocation, used to correlate logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of one inference job.
///
/// Created once per pipeline invocation and handed to the orchestrator.
/// `timeout` bounds the wall-clock wait for the output artifact;
/// `poll_interval` is the pause between existence checks and should be
/// materially smaller than `timeout`.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// The prepared input archive, already durably stored and readable by
    /// the inference service.
    pub input_location: S3Location,
    /// Maximum wall-clock duration to wait for completion.
    pub timeout: Duration,
    /// Pause between output existence checks.
    pub poll_interval: Duration,
    /// Invocation timeout hint forwarded to the endpoint at submission.
    pub timeout_hint: Duration,
}

impl JobRequest {
    pub fn new(input_location: S3Location, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            input_location,
            timeout,
            poll_interval,
            timeout_hint: DEFAULT_INVOCATION_TIMEOUT,
        }
    }

    /// Override the invocation timeout hint forwarded to the endpoint.
    pub fn with_timeout_hint(mut self, timeout_hint: Duration) -> Self {
        self.timeout_hint = timeout_hint;
        self
    }
}

/// Handle returned synchronously by job submission.
///
/// The endpoint commits to `output_location` at acceptance time; the
/// orchestrator owns the handle for the duration of one wait loop and
/// discards it once a terminal outcome is produced.
#[derive(Debug, Clone)]
pub struct JobHandle {
    /// Object the remote service will eventually populate.
    pub output_location: S3Location,
    /// Opaque submission metadata for log correlation.
    pub inference_id: String,
    /// When the endpoint accepted the job.
    pub submitted_at: DateTime<Utc>,
}

/// Terminal outcome of one inference job.
///
/// Produced exactly once per [`JobRequest`]; the orchestrator never returns
/// without one. Expected conditions (timeout, rejected submission,
/// cancellation) are variants here rather than errors, so callers always
/// get a definitive answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The output artifact appeared before the deadline.
    Completed { output_location: S3Location },
    /// The deadline elapsed with no completion signal observed.
    TimedOut { elapsed: Duration, deadline: Duration },
    /// The remote service rejected the job before any waiting began.
    Failed { reason: String },
    /// An external cancellation signal was observed mid-wait.
    Cancelled { elapsed: Duration },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}
