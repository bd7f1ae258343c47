//! Crate-wide error type.
//!
//! Every stage has its own error enum; [`PipelineError`] gathers them so the
//! coordinator and the bindings can surface any failure with one type.

use thiserror::Error;

use crate::encode::EncodeError;
use crate::session::{PreviewError, SessionError};
use crate::transform::RenderError;
use crate::upload::StorageError;
use crate::validate::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("Failed to generate an object name: {0}")]
    ObjectKey(String),
}

impl PipelineError {
    /// Stable machine-readable code for hosts.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Validation(ValidationError::NotAnImage { .. }) => "not_an_image",
            PipelineError::Validation(ValidationError::TooLarge { .. }) => "too_large",
            PipelineError::Validation(ValidationError::EmptyFile) => "empty_file",
            PipelineError::Validation(ValidationError::Undecodable(_)) => "undecodable",
            PipelineError::Validation(ValidationError::AspectUnreachable { .. }) => {
                "aspect_unreachable"
            }
            PipelineError::Render(RenderError::NoCropSelected) => "no_crop_selected",
            PipelineError::Render(RenderError::SurfaceUnavailable { .. }) => "surface_unavailable",
            PipelineError::Encode(EncodeError::EmptySurface { .. }) => "empty_surface",
            PipelineError::Encode(EncodeError::EncodingFailed(_)) => "encoding_failed",
            PipelineError::Storage(StorageError::BucketNotFound { .. }) => "bucket_not_found",
            PipelineError::Storage(StorageError::PermissionDenied { .. }) => "permission_denied",
            PipelineError::Storage(StorageError::NetworkOrUnknown { .. }) => "upload_failed",
            PipelineError::Session(SessionError::UploadInFlight) => "upload_in_flight",
            PipelineError::Session(_) => "invalid_state",
            PipelineError::Preview(_) => "preview_failed",
            PipelineError::ObjectKey(_) => "object_key",
        }
    }

    /// Message suitable for showing to the person who picked the file.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation(ValidationError::NotAnImage { .. }) => {
                "Please choose an image file.".to_string()
            }
            PipelineError::Validation(ValidationError::TooLarge { limit, .. }) => {
                format!("Image must be {} MB or smaller.", megabytes(*limit))
            }
            PipelineError::Validation(ValidationError::EmptyFile) => {
                "The selected file is empty.".to_string()
            }
            PipelineError::Validation(ValidationError::Undecodable(_)) => {
                "This image could not be read. Try a different file.".to_string()
            }
            PipelineError::Validation(ValidationError::AspectUnreachable { .. }) => {
                "This image is too wide or too tall to crop. Try a different file.".to_string()
            }
            PipelineError::Render(RenderError::NoCropSelected) => {
                "Select an area of the image to crop.".to_string()
            }
            PipelineError::Render(RenderError::SurfaceUnavailable { .. }) => {
                "The image is too large to process on this device.".to_string()
            }
            PipelineError::Encode(_) | PipelineError::ObjectKey(_) => {
                "Something went wrong while preparing the image. Please try again.".to_string()
            }
            PipelineError::Storage(StorageError::BucketNotFound { bucket, .. }) => format!(
                "Uploads are not set up yet (storage bucket \"{bucket}\" is missing). Please contact support."
            ),
            PipelineError::Storage(StorageError::PermissionDenied { .. }) => {
                "You do not have permission to upload this image.".to_string()
            }
            PipelineError::Storage(StorageError::NetworkOrUnknown { .. }) => {
                "Upload failed. Check your connection and try again.".to_string()
            }
            PipelineError::Session(err) => err.to_string(),
            PipelineError::Preview(_) => "Could not show a preview of this image.".to_string(),
        }
    }

    /// True when repeating the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Storage(StorageError::NetworkOrUnknown { .. })
                | PipelineError::Encode(_)
                | PipelineError::ObjectKey(_)
                | PipelineError::Preview(_)
        )
    }
}

fn megabytes(bytes: u64) -> u64 {
    bytes.div_ceil(1024 * 1024).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_FILE_BYTES;

    #[test]
    fn test_from_conversions() {
        let err: PipelineError = RenderError::NoCropSelected.into();
        assert_eq!(err.code(), "no_crop_selected");

        let err: PipelineError = SessionError::UploadInFlight.into();
        assert_eq!(err.code(), "upload_in_flight");
        assert_eq!(err.to_string(), "An upload is already in progress");
    }

    #[test]
    fn test_too_large_message() {
        let err = PipelineError::from(ValidationError::TooLarge {
            size: MAX_FILE_BYTES + 1,
            limit: MAX_FILE_BYTES,
        });
        assert_eq!(err.user_message(), "Image must be 10 MB or smaller.");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_bucket_not_found_message_names_bucket() {
        let err = PipelineError::from(StorageError::BucketNotFound {
            bucket: "media".into(),
            message: "Bucket not found".into(),
        });
        assert!(err.user_message().contains("\"media\""));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_classes() {
        let network = PipelineError::from(StorageError::NetworkOrUnknown {
            message: "timeout".into(),
        });
        assert!(network.is_retryable());

        let denied = PipelineError::from(StorageError::PermissionDenied {
            bucket: "media".into(),
            message: "403".into(),
        });
        assert!(!denied.is_retryable());
        assert_eq!(denied.code(), "permission_denied");
    }

    #[test]
    fn test_transparent_display() {
        let err = PipelineError::from(ValidationError::EmptyFile);
        assert_eq!(err.to_string(), "File is empty");
    }
}
