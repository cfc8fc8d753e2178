//! Object store gateway trait.

use std::path::Path;

use async_trait::async_trait;

use slomo_models::S3Location;

use crate::error::StorageResult;

/// Gateway to a remote object store.
///
/// Pure I/O boundary, no decision logic. The orchestrator consumes only
/// [`exists`](ObjectStore::exists); the pipeline uses the rest around it.
/// Implementations must be shareable across tasks.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether the object exists and is fully written.
    ///
    /// `Ok(false)` means the object is definitively not present. Transport
    /// failures surface as `Err` so callers can treat them as retryable
    /// rather than as absence.
    async fn exists(&self, location: &S3Location) -> StorageResult<bool>;

    /// Upload a local file to the given location.
    async fn upload_file(&self, path: &Path, location: &S3Location) -> StorageResult<()>;

    /// Download an object to a local file, creating parent directories.
    async fn download_file(&self, location: &S3Location, path: &Path) -> StorageResult<()>;

    /// Materialize every object under the remote prefix into `dir`,
    /// preserving the key structure below the prefix.
    async fn sync_prefix(&self, prefix: &S3Location, dir: &Path) -> StorageResult<()>;
}
