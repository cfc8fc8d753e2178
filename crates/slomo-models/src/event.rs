//! Inbound storage-change notifications.

use serde::Deserialize;

use crate::error::ModelError;

/// One storage-change notification, as delivered by the bucket's event
/// integration. Only the first record is consumed; the pipeline processes
/// exactly one object per invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

impl StorageEvent {
    /// Bucket name and decoded object key of the triggering object.
    ///
    /// Event keys arrive URL-encoded with `+` standing in for spaces;
    /// both layers are undone here.
    pub fn source(&self) -> Result<(String, String), ModelError> {
        let record = self
            .records
            .first()
            .ok_or_else(|| ModelError::invalid_event("no records in notification"))?;

        let key = record.s3.object.key.replace('+', " ");
        let key = urlencoding::decode(&key)
            .map_err(|e| ModelError::invalid_event(format!("undecodable object key: {e}")))?
            .into_owned();

        Ok((record.s3.bucket.name.clone(), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_json(key: &str) -> String {
        format!(
            r#"{{"Records":[{{"s3":{{"bucket":{{"name":"uploads"}},"object":{{"key":"{key}"}}}}}}]}}"#
        )
    }

    #[test]
    fn test_source_decodes_key() {
        let event: StorageEvent =
            serde_json::from_str(&event_json("videos/my+clip%20%281%29.mp4")).unwrap();

        let (bucket, key) = event.source().unwrap();
        assert_eq!(bucket, "uploads");
        assert_eq!(key, "videos/my clip (1).mp4");
    }

    #[test]
    fn test_source_plain_key() {
        let event: StorageEvent = serde_json::from_str(&event_json("videos/clip.mp4")).unwrap();
        let (_, key) = event.source().unwrap();
        assert_eq!(key, "videos/clip.mp4");
    }

    #[test]
    fn test_empty_records_rejected() {
        let event: StorageEvent = serde_json::from_str(r#"{"Records":[]}"#).unwrap();
        assert!(event.source().is_err());
    }
}
