//! Object store locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A bucket/key pair identifying one object in the store.
///
/// Serialized as an `s3://bucket/key` URI, which is how the inference
/// endpoint and its output manifest reference objects on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct S3Location {
    bucket: String,
    key: String,
}

impl S3Location {
    /// Create a location from a bucket and key.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The location of `name` directly under this location's key, treating
    /// the key as a prefix.
    pub fn join(&self, name: &str) -> Self {
        let key = if self.key.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.key.trim_end_matches('/'), name)
        };
        Self::new(&self.bucket, key)
    }

    /// The `s3://bucket/key` URI for this location.
    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

impl fmt::Display for S3Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl FromStr for S3Location {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("s3://")
            .ok_or_else(|| ModelError::invalid_location(format!("not an s3 URI: {s}")))?;

        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| ModelError::invalid_location(format!("missing object key: {s}")))?;

        if bucket.is_empty() || key.is_empty() {
            return Err(ModelError::invalid_location(format!(
                "empty bucket or key: {s}"
            )));
        }

        Ok(Self::new(bucket, key))
    }
}

impl TryFrom<String> for S3Location {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<S3Location> for String {
    fn from(location: S3Location) -> Self {
        location.uri()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let location: S3Location = "s3://models-bucket/slow-mo/input/clip.tar.gz"
            .parse()
            .unwrap();

        assert_eq!(location.bucket(), "models-bucket");
        assert_eq!(location.key(), "slow-mo/input/clip.tar.gz");
        assert_eq!(
            location.to_string(),
            "s3://models-bucket/slow-mo/input/clip.tar.gz"
        );
    }

    #[test]
    fn test_parse_rejects_bad_uris() {
        assert!("https://example.com/x".parse::<S3Location>().is_err());
        assert!("s3://bucket-only".parse::<S3Location>().is_err());
        assert!("s3:///key-only".parse::<S3Location>().is_err());
    }

    #[test]
    fn test_join() {
        let prefix = S3Location::new("bucket", "slow-mo/input/");
        assert_eq!(prefix.join("clip.tar.gz").key(), "slow-mo/input/clip.tar.gz");
    }

    #[test]
    fn test_serde_as_uri_string() {
        let location = S3Location::new("bucket", "result/output.json");
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, "\"s3://bucket/result/output.json\"");

        let back: S3Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, location);
    }
}
