//! Core types for source image decoding.

use image::RgbaImage;
use thiserror::Error;

/// Error types for source image decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in a recognized or enabled image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded image has a zero-sized side.
    #[error("Decoded image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// How the camera says the stored pixels must be turned to appear upright.
///
/// Values follow the EXIF `Orientation` tag (1 through 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Upright,
    Mirrored,
    UpsideDown,
    MirroredUpsideDown,
    /// Mirrored, then a quarter turn counter-clockwise.
    MirroredLeft,
    /// Needs a quarter turn clockwise.
    Right,
    /// Mirrored, then a quarter turn clockwise.
    MirroredRight,
    /// Needs a quarter turn counter-clockwise.
    Left,
}

impl Orientation {
    /// Map an EXIF tag value; unknown values are treated as upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Orientation::Mirrored,
            3 => Orientation::UpsideDown,
            4 => Orientation::MirroredUpsideDown,
            5 => Orientation::MirroredLeft,
            6 => Orientation::Right,
            7 => Orientation::MirroredRight,
            8 => Orientation::Left,
            _ => Orientation::Upright,
        }
    }
}

/// The user's photograph at natural (full) resolution.
///
/// Pixels are RGBA, row-major, upright (EXIF orientation already applied).
/// A `SourceImage` is immutable once created and is owned by exactly one
/// editing session.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Wrap an already-decoded RGBA raster.
    ///
    /// Returns `DecodeError::EmptyImage` for zero-area rasters.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, DecodeError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage { width, height });
        }
        Ok(Self { pixels })
    }

    /// Natural width in pixels.
    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural height in pixels.
    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(natural_width, natural_height)`.
    pub fn natural_dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
