//! Crop geometry: displayed-image percentages and their natural-pixel mapping.
//!
//! # Coordinate System
//!
//! - Crop values are percentages (0.0 to 100.0) of the *displayed* image
//! - (0, 0) is the top-left corner, (100, 100) the bottom-right corner
//! - Natural-pixel conversion scales by `natural / displayed` per axis

use serde::{Deserialize, Serialize};

use crate::config::CropShape;

/// On-screen size of the image in the editor, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Display size equal to the natural size (no on-screen scaling).
    pub fn natural(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// True when both sides are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An unconstrained rectangle proposed by interactive dragging (percentages).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole displayed image.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// A validated crop selection.
///
/// Invariant: `0 <= x, y`, `x + width <= 100`, `y + height <= 100`,
/// `width, height > 0`. Only [`CropSelector`](super::CropSelector) creates
/// regions, and it re-clamps after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub shape: CropShape,
    pub aspect_ratio: Option<f64>,
}

impl CropRegion {
    pub fn rect(&self) -> CropRect {
        CropRect::new(self.x, self.y, self.width, self.height)
    }

    /// Map this region onto natural-resolution pixels.
    ///
    /// Percentages are first resolved against the displayed size, then
    /// multiplied by `natural / displayed` to undo the editor's on-screen
    /// scaling. The result is rounded to whole pixels, clamped to the image,
    /// and never smaller than 1x1.
    pub fn to_natural_pixels(&self, natural: (u32, u32), display: DisplaySize) -> PixelRect {
        let (natural_w, natural_h) = natural;
        let display = if display.is_valid() {
            display
        } else {
            DisplaySize::natural(natural_w, natural_h)
        };

        let ratio_x = natural_w as f64 / display.width;
        let ratio_y = natural_h as f64 / display.height;

        let left = self.x / 100.0 * display.width * ratio_x;
        let top = self.y / 100.0 * display.height * ratio_y;
        let right = (self.x + self.width) / 100.0 * display.width * ratio_x;
        let bottom = (self.y + self.height) / 100.0 * display.height * ratio_y;

        let px_left = (left.round().max(0.0) as u32).min(natural_w.saturating_sub(1));
        let px_top = (top.round().max(0.0) as u32).min(natural_h.saturating_sub(1));
        let px_right = (right.round().max(0.0) as u32).min(natural_w);
        let px_bottom = (bottom.round().max(0.0) as u32).min(natural_h);

        PixelRect {
            x: px_left,
            y: px_top,
            width: px_right.saturating_sub(px_left).max(1),
            height: px_bottom.saturating_sub(px_top).max(1),
        }
    }
}

/// Integer rectangle in natural-resolution pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
