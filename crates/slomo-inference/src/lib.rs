//! Client for the asynchronous frame-interpolation endpoint.
//!
//! The remote service accepts a job referencing an input archive in the
//! object store and commits, synchronously with acceptance, to the location
//! it will eventually write its output manifest to. The service is otherwise
//! opaque: it exposes no status API, and its only observable side effect is
//! that output object appearing.

pub mod client;
pub mod error;
pub mod types;

pub use client::{EndpointClient, EndpointConfig, InferenceEndpoint};
pub use error::{InferenceError, InferenceResult};
pub use types::{InvocationRequest, InvocationResponse};
