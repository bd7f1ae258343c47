//! Prepared uploads.

use bytes::Bytes;

use crate::config::UploadTarget;
use crate::encode::EncodedAsset;

use super::path::object_path;
use super::storage::{ObjectStorage, RawStorageError, UploadOptions};

/// One prepared upload: encoded bytes plus their destination.
///
/// Jobs are produced by the coordinator and can be executed outside of it,
/// so the host never holds the coordinator across an await.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadJob {
    bucket: String,
    path: String,
    bytes: Bytes,
    options: UploadOptions,
}

impl UploadJob {
    pub(crate) fn new(target: &UploadTarget, object_id: &str, asset: &EncodedAsset) -> Self {
        Self {
            bucket: target.bucket.clone(),
            path: object_path(&target.folder, object_id, asset.extension()),
            bytes: asset.shared_bytes(),
            options: UploadOptions {
                content_type: asset.mime_type().to_string(),
                cache_control: target.cache_control.clone(),
                upsert: target.upsert,
            },
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Upload and resolve the public URL of the stored object.
    pub async fn execute<S>(&self, storage: &S) -> Result<String, RawStorageError>
    where
        S: ObjectStorage + ?Sized,
    {
        log::info!(
            "uploading {} bytes to {}/{}",
            self.bytes.len(),
            self.bucket,
            self.path
        );
        let stored = storage
            .upload(&self.bucket, &self.path, self.bytes.clone(), &self.options)
            .await?;
        Ok(storage.public_url(&self.bucket, &stored))
    }
}
