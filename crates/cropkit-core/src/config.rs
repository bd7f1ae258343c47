//! Upload target configuration and pipeline-wide limits.
//!
//! An [`UploadTarget`] describes everything the pipeline needs to know about
//! where an asset ends up and what shape it must have. Targets are plain data
//! and round-trip through serde so browser callers can pass them as JS objects.

use serde::{Deserialize, Serialize};

/// Maximum accepted size of a selected file (10 MiB).
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Crop candidates with a side at or below this percentage are rejected.
pub const MIN_CROP_PERCENT: f64 = 1.0;

/// Smallest zoom factor accepted anywhere in the pipeline.
pub const MIN_SCALE: f64 = 0.5;

/// Largest zoom factor accepted anywhere in the pipeline.
pub const MAX_SCALE: f64 = 2.0;

/// Rotation applied by the rotate-left / rotate-right buttons.
pub const ROTATION_STEP_DEGREES: f64 = 90.0;

/// Output quality on a 0-1 scale.
pub const OUTPUT_QUALITY: f32 = 0.9;

/// MIME type of every encoded asset.
pub const OUTPUT_MIME: &str = "image/jpeg";

/// File extension matching [`OUTPUT_MIME`].
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Default `Cache-Control` max-age (seconds) sent with uploads.
pub const DEFAULT_CACHE_CONTROL: &str = "3600";

/// Maximum logical size of the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl OutputBounds {
    pub const AVATAR: OutputBounds = OutputBounds::new(400, 400);
    pub const LOGO: OutputBounds = OutputBounds::new(600, 600);

    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// True when either side is zero; such bounds can never hold a raster.
    pub fn is_empty(&self) -> bool {
        self.max_width == 0 || self.max_height == 0
    }
}

/// Visual shape of the crop selection.
///
/// The shape only affects how the selection is presented; the rendered
/// raster is always the bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CropShape {
    #[default]
    Rectangular,
    Elliptical,
}

/// Destination and constraints for one kind of upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    /// Storage bucket name.
    pub bucket: String,
    /// Folder prefix inside the bucket (may be empty).
    #[serde(default)]
    pub folder: String,
    pub bounds: OutputBounds,
    #[serde(default)]
    pub shape: CropShape,
    /// Fixed width/height ratio, measured in displayed pixels.
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    /// When false, a selected file is uploaded immediately with a full-image crop.
    #[serde(default = "default_true")]
    pub editor_enabled: bool,
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
    #[serde(default)]
    pub upsert: bool,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_true() -> bool {
    true
}

fn default_cache_control() -> String {
    DEFAULT_CACHE_CONTROL.to_string()
}

fn default_max_file_bytes() -> u64 {
    MAX_FILE_BYTES
}

impl UploadTarget {
    /// Create a target with default options.
    pub fn new(bucket: impl Into<String>, bounds: OutputBounds) -> Self {
        Self {
            bucket: bucket.into(),
            folder: String::new(),
            bounds,
            shape: CropShape::Rectangular,
            aspect_ratio: None,
            editor_enabled: true,
            cache_control: default_cache_control(),
            upsert: false,
            max_file_bytes: MAX_FILE_BYTES,
        }
    }

    /// Square, elliptical profile picture capped at 400x400.
    pub fn avatar(bucket: impl Into<String>) -> Self {
        Self {
            folder: "avatars".to_string(),
            shape: CropShape::Elliptical,
            aspect_ratio: Some(1.0),
            ..Self::new(bucket, OutputBounds::AVATAR)
        }
    }

    /// Free-form company logo capped at 600x600.
    pub fn logo(bucket: impl Into<String>) -> Self {
        Self {
            folder: "logos".to_string(),
            ..Self::new(bucket, OutputBounds::LOGO)
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: Option<f64>) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_editor(mut self, enabled: bool) -> Self {
        self.editor_enabled = enabled;
        self
    }

    /// The configured aspect ratio, ignoring non-finite or non-positive values.
    pub fn effective_aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio.filter(|r| r.is_finite() && *r > 0.0)
    }
}
