//! Render a crop selection with zoom and rotation into an output raster.
//!
//! # Algorithm
//!
//! 1. Map the display-percentage crop onto natural pixels
//! 2. Size the output: `min(crop_px * scale, max)` per axis
//! 3. Allocate a surface of `output * pixel_density` physical pixels
//! 4. Draw the crop so it fills the output, under the transform
//!    `translate(center) * rotate(theta) * scale(s) * translate(-center)`
//!
//! Step 4 uses inverse mapping: each physical output pixel is taken to logical
//! units, pushed through the inverse transform into the filled-crop space, and
//! from there into source pixels where it is sampled bilinearly:
//!
//! ```text
//! q = center + R(-theta) * (p - center) / s
//! src = crop.origin + q * crop.size / output.size
//! ```
//!
//! Output pixels whose `q` falls outside the filled region stay transparent.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::config::OutputBounds;
use crate::crop::{CropRegion, DisplaySize, PixelRect};
use crate::decode::SourceImage;

use super::sample::sample_bilinear;
use super::TransformParams;

/// Largest side of a drawing surface, in physical pixels.
pub const MAX_SURFACE_DIMENSION: u64 = 16_384;

/// Largest area of a drawing surface, in physical pixels.
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// Errors that can occur while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Commit was requested with no crop region selected.
    #[error("No crop region selected")]
    NoCropSelected,

    /// The drawing surface could not be created.
    #[error("Drawing surface of {width}x{height} pixels is unavailable")]
    SurfaceUnavailable { width: u64, height: u64 },
}

/// How the source image is presented: its on-screen size and the device's
/// physical-to-logical pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub display: DisplaySize,
    pub pixel_density: f64,
}

impl Viewport {
    pub fn new(display: DisplaySize, pixel_density: f64) -> Self {
        Self {
            display,
            pixel_density,
        }
    }

    /// Image displayed at natural size on a density-1 device.
    pub fn natural(source: &SourceImage) -> Self {
        let (width, height) = source.natural_dimensions();
        Self::new(DisplaySize::natural(width, height), 1.0)
    }

    /// Pixel density, falling back to 1.0 for non-finite or non-positive values.
    pub fn effective_pixel_density(&self) -> f64 {
        if self.pixel_density.is_finite() && self.pixel_density > 0.0 {
            self.pixel_density
        } else {
            1.0
        }
    }
}

/// The rendered output of one commit. Immutable once created.
#[derive(Debug, Clone)]
pub struct RenderedRaster {
    pixels: RgbaImage,
    logical_width: u32,
    logical_height: u32,
    pixel_density: f64,
}

impl RenderedRaster {
    /// Wrap an existing raster at pixel density 1.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let (logical_width, logical_height) = pixels.dimensions();
        Self {
            pixels,
            logical_width,
            logical_height,
            pixel_density: 1.0,
        }
    }

    /// Physical width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Physical height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Size in logical units, bounded by the target's [`OutputBounds`].
    pub fn logical_dimensions(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }
}

/// Logical output size for a natural-pixel crop.
///
/// Scale is applied before the bounds clamp, so zoomed crops still respect
/// the maximum size. Each side is at least 1.
pub fn output_size(crop: &PixelRect, scale: f64, bounds: OutputBounds) -> (u32, u32) {
    (
        output_side(crop.width, scale, bounds.max_width),
        output_side(crop.height, scale, bounds.max_height),
    )
}

fn output_side(crop_px: u32, scale: f64, max: u32) -> u32 {
    (crop_px as f64 * scale).min(max as f64).round().max(1.0) as u32
}

/// Render `crop` of `source` under `transform`, bounded by `bounds`.
///
/// Scale is clamped to the supported zoom range here as well, so
/// programmatic callers get the same result as the editor controls.
///
/// # Errors
///
/// Returns `RenderError::NoCropSelected` if `crop` is `None`.
/// Returns `RenderError::SurfaceUnavailable` if the physical surface would be
/// empty or exceed [`MAX_SURFACE_DIMENSION`] / [`MAX_SURFACE_AREA`].
pub fn render(
    source: &SourceImage,
    crop: Option<&CropRegion>,
    transform: &TransformParams,
    bounds: OutputBounds,
    viewport: &Viewport,
) -> Result<RenderedRaster, RenderError> {
    let crop = crop.ok_or(RenderError::NoCropSelected)?;

    if bounds.is_empty() {
        return Err(RenderError::SurfaceUnavailable {
            width: bounds.max_width as u64,
            height: bounds.max_height as u64,
        });
    }

    let scale = transform.clamped_scale();
    let rotation = transform.normalized_rotation();
    let density = viewport.effective_pixel_density();

    let src = crop.to_natural_pixels(source.natural_dimensions(), viewport.display);
    let (final_w, final_h) = output_size(&src, scale, bounds);

    let surface_w = (final_w as f64 * density).round() as u64;
    let surface_h = (final_h as f64 * density).round() as u64;
    check_surface(surface_w, surface_h)?;
    let (surface_w, surface_h) = (surface_w as u32, surface_h as u32);

    let pixels = if transform.is_identity() {
        log::debug!("render: direct copy of {src:?} into {surface_w}x{surface_h}");
        copy_crop(source, &src, surface_w, surface_h)
    } else {
        log::debug!(
            "render: {src:?} into {final_w}x{final_h} @{density}x, scale {scale}, rotation {rotation}"
        );
        draw_transformed(
            source,
            &src,
            (final_w, final_h),
            (surface_w, surface_h),
            density,
            scale,
            rotation,
        )
    };

    Ok(RenderedRaster {
        pixels,
        logical_width: final_w,
        logical_height: final_h,
        pixel_density: density,
    })
}

fn check_surface(width: u64, height: u64) -> Result<(), RenderError> {
    let fits = width > 0
        && height > 0
        && width <= MAX_SURFACE_DIMENSION
        && height <= MAX_SURFACE_DIMENSION
        && width * height <= MAX_SURFACE_AREA;
    if fits {
        Ok(())
    } else {
        Err(RenderError::SurfaceUnavailable { width, height })
    }
}

/// Identity transform: copy the crop, resampling only if the surface differs
/// in size (bounds clamp or pixel density).
fn copy_crop(source: &SourceImage, src: &PixelRect, width: u32, height: u32) -> RgbaImage {
    let cropped = imageops::crop_imm(source.pixels(), src.x, src.y, src.width, src.height).to_image();
    if cropped.dimensions() == (width, height) {
        cropped
    } else {
        imageops::resize(&cropped, width, height, FilterType::Triangle)
    }
}

fn draw_transformed(
    source: &SourceImage,
    src: &PixelRect,
    (final_w, final_h): (u32, u32),
    (surface_w, surface_h): (u32, u32),
    density: f64,
    scale: f64,
    rotation_degrees: f64,
) -> RgbaImage {
    let final_w = final_w as f64;
    let final_h = final_h as f64;
    let cx = final_w / 2.0;
    let cy = final_h / 2.0;

    let theta = rotation_degrees.to_radians();
    let cos = theta.cos();
    let sin = theta.sin();

    // Filled-crop space to source pixels
    let step_x = src.width as f64 / final_w;
    let step_y = src.height as f64 / final_h;

    let mut surface = RgbaImage::from_pixel(surface_w, surface_h, Rgba([0, 0, 0, 0]));

    for (px, py, pixel) in surface.enumerate_pixels_mut() {
        // Physical pixel center to logical units
        let dx = (px as f64 + 0.5) / density - cx;
        let dy = (py as f64 + 0.5) / density - cy;

        // Inverse rotation, then inverse scale
        let qx = cx + (dx * cos + dy * sin) / scale;
        let qy = cy + (-dx * sin + dy * cos) / scale;

        if qx < 0.0 || qy < 0.0 || qx > final_w || qy > final_h {
            continue;
        }

        let sx = src.x as f64 + qx * step_x - 0.5;
        let sy = src.y as f64 + qy * step_y - 0.5;
        *pixel = Rgba(sample_bilinear(source.pixels(), src, sx, sy));
    }

    surface
}


// ============================================================================
// Property-Based Tests
// ============================================================================
