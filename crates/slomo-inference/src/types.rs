//! Endpoint request/response types.

use serde::{Deserialize, Serialize};

/// Body of one asynchronous invocation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// URI of the prepared input archive.
    pub input_location: String,
    /// How long the service may spend on this invocation before dropping it.
    pub invocation_timeout_seconds: u64,
}

/// Acceptance response for an asynchronous invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// URI the service will write its output manifest to.
    pub output_location: String,
    /// Correlation identifier assigned by the service.
    pub inference_id: String,
}
