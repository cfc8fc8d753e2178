//! Inference endpoint HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, warn};

use slomo_models::{JobHandle, S3Location};

use crate::error::{InferenceError, InferenceResult};
use crate::types::{InvocationRequest, InvocationResponse};

/// Submits asynchronous inference jobs.
///
/// The handle's `output_location` is known synchronously with acceptance;
/// callers never have to discover it later. A rejected submission (bad
/// payload, endpoint unavailable, auth failure) surfaces as an error here
/// and is not retried by the orchestrator.
#[async_trait]
pub trait InferenceEndpoint: Send + Sync {
    async fn submit_async(
        &self,
        input: &S3Location,
        timeout_hint: Duration,
    ) -> InferenceResult<JobHandle>;
}

/// Configuration for the endpoint client.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Base URL of the inference service
    pub base_url: String,
    /// Name of the deployed interpolation endpoint
    pub endpoint_name: String,
    /// Request timeout for the submission call itself
    pub request_timeout: Duration,
    /// Max transport-level retries
    pub max_retries: u32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            endpoint_name: "slow-mo".to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

impl EndpointConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SLOMO_ENDPOINT_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            endpoint_name: std::env::var("SLOMO_ENDPOINT_NAME")
                .unwrap_or_else(|_| "slow-mo".to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("SLOMO_ENDPOINT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_retries: std::env::var("SLOMO_ENDPOINT_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// HTTP client for the asynchronous inference endpoint.
pub struct EndpointClient {
    http: Client,
    config: EndpointConfig,
}

impl EndpointClient {
    /// Create a new endpoint client.
    pub fn new(config: EndpointConfig) -> InferenceResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(InferenceError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> InferenceResult<Self> {
        Self::new(EndpointConfig::from_env())
    }

    fn invocation_url(&self) -> String {
        format!(
            "{}/endpoints/{}/async-invocations",
            self.config.base_url, self.config.endpoint_name
        )
    }

    /// Execute with retry logic for transport-level failures.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> InferenceResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = InferenceResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Invocation request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(InferenceError::Rejected("Unknown error".to_string())))
    }
}

#[async_trait]
impl InferenceEndpoint for EndpointClient {
    async fn submit_async(
        &self,
        input: &S3Location,
        timeout_hint: Duration,
    ) -> InferenceResult<JobHandle> {
        let url = self.invocation_url();
        let body = InvocationRequest {
            input_location: input.uri(),
            invocation_timeout_seconds: timeout_hint.as_secs(),
        };

        debug!("Submitting async invocation to {}", url);

        let response = self
            .with_retry(|| async {
                self.http
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(InferenceError::Network)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Rejected(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let accepted: InvocationResponse = response.json().await?;

        let output_location = accepted
            .output_location
            .parse::<S3Location>()
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        debug!(
            inference_id = %accepted.inference_id,
            output = %output_location,
            "Invocation accepted"
        );

        Ok(JobHandle {
            output_location,
            inference_id: accepted.inference_id,
            submitted_at: Utc::now(),
        })
    }
}
