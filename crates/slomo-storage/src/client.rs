//! S3 client implementation.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use slomo_models::S3Location;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Region
    pub region: String,
    /// Custom endpoint URL for S3-compatible stores; None for AWS
    pub endpoint_url: Option<String>,
    /// Static credentials; None to use the default provider chain
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            region: std::env::var("SLOMO_S3_REGION")
                .map_err(|_| StorageError::config_error("SLOMO_S3_REGION not set"))?,
            endpoint_url: std::env::var("SLOMO_S3_ENDPOINT_URL").ok(),
            access_key_id: std::env::var("SLOMO_S3_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("SLOMO_S3_SECRET_ACCESS_KEY").ok(),
        })
    }
}

/// S3 object store client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a new client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(id, secret, None, None, "slomo"));
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        Ok(Self { client })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// List keys under a prefix, following continuation tokens.
    pub async fn list_keys(&self, prefix: &S3Location) -> StorageResult<Vec<String>> {
        debug!("Listing objects under {}", prefix);

        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(prefix.bucket())
                .prefix(prefix.key());

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;

            if let Some(contents) = &response.contents {
                keys.extend(contents.iter().filter_map(|obj| obj.key.clone()));
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn exists(&self, location: &S3Location) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(location.bucket())
            .key(location.key())
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::transport(e.to_string()))
                }
            }
        }
    }

    async fn upload_file(&self, path: &Path, location: &S3Location) -> StorageResult<()> {
        debug!("Uploading {} to {}", path.display(), location);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(location.bucket())
            .key(location.key())
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}", path.display(), location);
        Ok(())
    }

    async fn download_file(&self, location: &S3Location, path: &Path) -> StorageResult<()> {
        debug!("Downloading {} to {}", location, path.display());

        let response = self
            .client
            .get_object()
            .bucket(location.bucket())
            .key(location.key())
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("NoSuchKey") {
                    StorageError::not_found(location.key())
                } else {
                    StorageError::download_failed(e.to_string())
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?
            .into_bytes();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::download_failed(format!("Failed to create directory: {e}"))
            })?;
        }

        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| StorageError::download_failed(format!("Failed to write file: {e}")))?;

        info!("Downloaded {} to {}", location, path.display());
        Ok(())
    }

    async fn sync_prefix(&self, prefix: &S3Location, dir: &Path) -> StorageResult<()> {
        let keys = self.list_keys(prefix).await?;

        if keys.is_empty() {
            return Err(StorageError::not_found(prefix.key()));
        }

        tokio::fs::create_dir_all(dir).await?;

        let base = prefix.key().trim_end_matches('/');
        let mut synced = 0usize;

        for key in keys {
            let relative = key
                .strip_prefix(base)
                .unwrap_or(&key)
                .trim_start_matches('/');

            // Directory placeholder objects carry no content
            if relative.is_empty() || key.ends_with('/') {
                continue;
            }

            let target = dir.join(relative);
            self.download_file(&S3Location::new(prefix.bucket(), &key), &target)
                .await?;
            synced += 1;
        }

        info!("Synced {} objects from {} to {}", synced, prefix, dir.display());
        Ok(())
    }
}
