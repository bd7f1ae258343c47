//! Remote object storage seam.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Per-object options sent with an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    pub content_type: String,
    pub cache_control: String,
    pub upsert: bool,
}

/// Failure exactly as reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RawStorageError {
    pub message: String,
    pub status: Option<u16>,
}

impl RawStorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Storage failures, classified for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage bucket \"{bucket}\" does not exist: {message}")]
    BucketNotFound { bucket: String, message: String },

    #[error("Not allowed to upload to \"{bucket}\": {message}")]
    PermissionDenied { bucket: String, message: String },

    #[error("Upload failed: {message}")]
    NetworkOrUnknown { message: String },
}

impl StorageError {
    /// Sort a backend failure into one of the user-facing classes.
    pub fn classify(bucket: &str, raw: &RawStorageError) -> Self {
        let message = raw.message.to_ascii_lowercase();
        let bucket_missing = message.contains("bucket not found")
            || (message.contains("bucket") && message.contains("not exist"))
            || (raw.status == Some(404) && message.contains("bucket"));
        let denied = matches!(raw.status, Some(401 | 403))
            || message.contains("permission")
            || message.contains("row-level security")
            || message.contains("unauthorized");

        if bucket_missing {
            StorageError::BucketNotFound {
                bucket: bucket.to_string(),
                message: raw.message.clone(),
            }
        } else if denied {
            StorageError::PermissionDenied {
                bucket: bucket.to_string(),
                message: raw.message.clone(),
            }
        } else {
            StorageError::NetworkOrUnknown {
                message: raw.message.clone(),
            }
        }
    }
}

/// A bucket-and-path object store with public URLs.
///
/// Futures are not required to be `Send`: on the web they wrap JS promises.
#[async_trait(?Send)]
pub trait ObjectStorage {
    /// Store `bytes` at `path` in `bucket`, returning the stored path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        options: &UploadOptions,
    ) -> Result<String, RawStorageError>;

    /// Stable public URL of a stored object.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bucket_not_found() {
        let raw = RawStorageError::new("Bucket not found");
        assert!(matches!(
            StorageError::classify("avatars", &raw),
            StorageError::BucketNotFound { ref bucket, .. } if bucket == "avatars"
        ));

        let raw = RawStorageError::new("The resource bucket is missing").with_status(404);
        assert!(matches!(
            StorageError::classify("b", &raw),
            StorageError::BucketNotFound { .. }
        ));
    }

    #[test]
    fn test_classify_permission_denied() {
        let cases = [
            RawStorageError::new("new row violates row-level security policy"),
            RawStorageError::new("Unauthorized"),
            RawStorageError::new("nope").with_status(403),
            RawStorageError::new("jwt expired").with_status(401),
        ];
        for raw in cases {
            assert!(
                matches!(
                    StorageError::classify("b", &raw),
                    StorageError::PermissionDenied { .. }
                ),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_classify_other() {
        let raw = RawStorageError::new("Failed to fetch");
        assert_eq!(
            StorageError::classify("b", &raw),
            StorageError::NetworkOrUnknown {
                message: "Failed to fetch".into()
            }
        );

        let raw = RawStorageError::new("Object not found").with_status(404);
        assert!(matches!(
            StorageError::classify("b", &raw),
            StorageError::NetworkOrUnknown { .. }
        ));
    }

    #[test]
    fn test_options_serialize_camel_case() {
        let options = UploadOptions {
            content_type: "image/jpeg".into(),
            cache_control: "3600".into(),
            upsert: false,
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(
            json,
            r#"{"contentType":"image/jpeg","cacheControl":"3600","upsert":false}"#
        );
    }
}
