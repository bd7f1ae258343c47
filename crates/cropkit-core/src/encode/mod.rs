//! Encoding of rendered rasters for upload.
//!
//! There is exactly one output format (JPEG) at one quality (0.9). The
//! encoded bytes live in a cheaply clonable buffer so a failed upload can be
//! retried without re-encoding.

mod jpeg;

use bytes::Bytes;

use crate::config::{OUTPUT_EXTENSION, OUTPUT_MIME, OUTPUT_QUALITY};

pub use jpeg::{encode, EncodeError};

/// A compressed, immutable output image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAsset {
    bytes: Bytes,
    mime_type: &'static str,
    extension: &'static str,
    quality: f32,
}

impl EncodedAsset {
    pub(crate) fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(bytes),
            mime_type: OUTPUT_MIME,
            extension: OUTPUT_EXTENSION,
            quality: OUTPUT_QUALITY,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the encoded bytes.
    pub fn shared_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
