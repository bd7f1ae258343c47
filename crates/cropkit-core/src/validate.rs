//! Gatekeeping for user-selected files.
//!
//! Validation happens before any decoding work so an oversized or non-image
//! file never reaches the decoder.

use thiserror::Error;

/// A file picked by the user, as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported file type \"{mime_type}\": only images are accepted")]
    NotAnImage { mime_type: String },

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("File is empty")]
    EmptyFile,

    /// The file claimed to be an image but could not be decoded.
    #[error("Image could not be decoded: {0}")]
    Undecodable(String),

    /// No crop of the required aspect ratio fits the image.
    #[error("A {width}x{height} image has no crop of the required aspect ratio")]
    AspectUnreachable { width: u32, height: u32 },
}

/// True for `image/<subtype>` MIME types.
pub fn is_image_mime(mime_type: &str) -> bool {
    let mime = mime_type.trim().to_ascii_lowercase();
    mime.strip_prefix("image/")
        .is_some_and(|subtype| !subtype.is_empty())
}

/// Check type, emptiness and size of a selected file, in that order.
///
/// # Errors
///
/// Returns the first failing check as a [`ValidationError`].
pub fn validate_file(file: &SelectedFile, max_bytes: u64) -> Result<(), ValidationError> {
    if !is_image_mime(&file.mime_type) {
        return Err(ValidationError::NotAnImage {
            mime_type: file.mime_type.clone(),
        });
    }
    if file.bytes.is_empty() {
        return Err(ValidationError::EmptyFile);
    }
    if file.size() > max_bytes {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            limit: max_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_FILE_BYTES;

    #[test]
    fn test_accepts_images() {
        let file = SelectedFile::new("a.png", "image/png", vec![1; 32]);
        assert_eq!(validate_file(&file, MAX_FILE_BYTES), Ok(()));
    }

    #[test]
    fn test_rejects_non_image() {
        let file = SelectedFile::new("a.pdf", "application/pdf", vec![1; 32]);
        assert_eq!(
            validate_file(&file, MAX_FILE_BYTES),
            Err(ValidationError::NotAnImage {
                mime_type: "application/pdf".into()
            })
        );
    }

    #[test]
    fn test_rejects_empty() {
        let file = SelectedFile::new("a.png", "image/png", Vec::new());
        assert_eq!(validate_file(&file, MAX_FILE_BYTES), Err(ValidationError::EmptyFile));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let at_limit = SelectedFile::new("a.jpg", "image/jpeg", vec![0; 64]);
        assert_eq!(validate_file(&at_limit, 64), Ok(()));

        let over = SelectedFile::new("a.jpg", "image/jpeg", vec![0; 65]);
        assert_eq!(
            validate_file(&over, 64),
            Err(ValidationError::TooLarge { size: 65, limit: 64 })
        );
    }

    #[test]
    fn test_mime_check_runs_first() {
        let file = SelectedFile::new("a.txt", "text/plain", Vec::new());
        assert!(matches!(
            validate_file(&file, 0),
            Err(ValidationError::NotAnImage { .. })
        ));
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/webp"));
        assert!(is_image_mime(" IMAGE/JPEG "));
        assert!(!is_image_mime("image/"));
        assert!(!is_image_mime("video/mp4"));
        assert!(!is_image_mime(""));
    }
}
