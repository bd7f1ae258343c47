//! JPEG encoding of rendered rasters.
//!
//! Uses the `image` crate's JPEG encoder at the fixed output quality.
//! Transparent areas are flattened onto black, the same result a canvas
//! JPEG export produces.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::config::OUTPUT_QUALITY;
use crate::transform::RenderedRaster;

use super::EncodedAsset;

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The raster has zero area. Indicates an upstream logic bug.
    #[error("Cannot encode an empty surface ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    /// JPEG encoding failed.
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a rendered raster into the single output format.
///
/// Deterministic: identical rasters produce identical bytes.
///
/// # Errors
///
/// Returns `EncodeError::EmptySurface` if the raster has zero area.
pub fn encode(raster: &RenderedRaster) -> Result<EncodedAsset, EncodeError> {
    if raster.is_empty() {
        return Err(EncodeError::EmptySurface {
            width: raster.width(),
            height: raster.height(),
        });
    }

    let rgb = flatten_on_black(raster.pixels().as_raw());
    let bytes = encode_jpeg(&rgb, raster.width(), raster.height(), jpeg_quality(OUTPUT_QUALITY))?;

    log::debug!(
        "encoded {}x{} raster into {} bytes",
        raster.width(),
        raster.height(),
        bytes.len()
    );

    Ok(EncodedAsset::jpeg(bytes))
}

/// Map a 0-1 quality onto the JPEG encoder's 1-100 scale.
pub(crate) fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Composite RGBA over opaque black, dropping the alpha channel.
fn flatten_on_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &channel in &px[..3] {
            rgb.push(((channel as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Cursor::new(Vec::new());

    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OUTPUT_MIME;
    use image::{Rgba, RgbaImage};

    fn raster(width: u32, height: u32, pixel: [u8; 4]) -> RenderedRaster {
        RenderedRaster::from_rgba(RgbaImage::from_pixel(width, height, Rgba(pixel)))
    }

    #[test]
    fn test_encode_basic() {
        let asset = encode(&raster(100, 100, [128, 128, 128, 255])).unwrap();

        // SOI and EOI markers
        assert_eq!(&asset.bytes()[0..2], &[0xFF, 0xD8]);
        let len = asset.len();
        assert_eq!(&asset.bytes()[len - 2..], &[0xFF, 0xD9]);

        assert_eq!(asset.mime_type(), OUTPUT_MIME);
        assert_eq!(asset.quality(), 0.9);
    }

    #[test]
    fn test_encode_empty_surface() {
        let result = encode(&raster(0, 10, [0, 0, 0, 255]));
        assert_eq!(
            result.unwrap_err(),
            EncodeError::EmptySurface {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let img = RgbaImage::from_fn(30, 20, |x, y| Rgba([(x * 8) as u8, (y * 12) as u8, 77, 255]));
        let a = encode(&RenderedRaster::from_rgba(img.clone())).unwrap();
        let b = encode(&RenderedRaster::from_rgba(img)).unwrap();
        assert_eq!(a.bytes(), b.bytes());
    }

    #[test]
    fn test_encode_single_pixel() {
        let asset = encode(&raster(1, 1, [255, 0, 0, 255])).unwrap();
        assert_eq!(&asset.bytes()[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_flatten_on_black() {
        let rgba = [200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128];
        assert_eq!(flatten_on_black(&rgba), vec![200, 100, 50, 0, 0, 0, 128, 128, 128]);
    }

    #[test]
    fn test_transparent_raster_decodes_dark() {
        let asset = encode(&raster(16, 16, [255, 255, 255, 0])).unwrap();
        let decoded = image::load_from_memory(asset.bytes()).unwrap().into_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c < 8)));
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.9), 90);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(2.0), 100);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use proptest::prelude::*;

    proptest! {
        /// Property: any non-empty raster encodes to a well-formed JPEG.
        #[test]
        fn prop_valid_raster_produces_valid_jpeg(
            (width, height) in (1u32..=40, 1u32..=40),
            pixel in any::<[u8; 4]>(),
        ) {
            let raster = RenderedRaster::from_rgba(RgbaImage::from_pixel(width, height, Rgba(pixel)));
            let asset = encode(&raster).unwrap();

            prop_assert_eq!(&asset.bytes()[0..2], &[0xFF, 0xD8]);
            let len = asset.len();
            prop_assert!(len >= 4);
            prop_assert_eq!(&asset.bytes()[len - 2..], &[0xFF, 0xD9]);
        }

        /// Property: same raster, same bytes.
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            seed in any::<u8>(),
        ) {
            let img = RgbaImage::from_fn(width, height, |x, y| {
                Rgba([seed.wrapping_add(x as u8), seed.wrapping_mul(y as u8), 9, 255])
            });
            let a = encode(&RenderedRaster::from_rgba(img.clone())).unwrap();
            let b = encode(&RenderedRaster::from_rgba(img)).unwrap();
            prop_assert_eq!(a.bytes(), b.bytes());
        }
    }
}
