//! Interactive crop selection with shape and aspect-ratio constraints.

use crate::config::{CropShape, MIN_CROP_PERCENT};

use super::{CropRect, CropRegion, DisplaySize};

/// Side of the centred box the default selection is fitted into (percent).
const DEFAULT_CROP_PERCENT: f64 = 90.0;

/// Owns the crop region of one editing session.
///
/// Every candidate goes through the same constraint pipeline: normalize
/// negative drags, clip to the image, fit the fixed aspect ratio by shrinking,
/// then reject anything at or below [`MIN_CROP_PERCENT`]. A rejected
/// candidate leaves the previous region in place.
#[derive(Debug, Clone)]
pub struct CropSelector {
    region: Option<CropRegion>,
    shape: CropShape,
    aspect_ratio: Option<f64>,
    display: DisplaySize,
}

impl CropSelector {
    /// Create a selector with no region selected yet.
    pub fn new(shape: CropShape, aspect_ratio: Option<f64>, display: DisplaySize) -> Self {
        Self {
            region: None,
            shape,
            aspect_ratio: aspect_ratio.filter(|r| r.is_finite() && *r > 0.0),
            display,
        }
    }

    /// Create a selector holding the default centred region.
    pub fn with_default_region(
        shape: CropShape,
        aspect_ratio: Option<f64>,
        display: DisplaySize,
    ) -> Self {
        let mut selector = Self::new(shape, aspect_ratio, display);
        selector.reset_to_default();
        selector
    }

    /// Create a selector covering the whole image with no aspect constraint.
    ///
    /// Used when the upload target skips the editor.
    pub fn full_image(shape: CropShape, display: DisplaySize) -> Self {
        let mut selector = Self::new(shape, None, display);
        selector.set_crop(CropRect::full());
        selector
    }

    pub fn region(&self) -> Option<&CropRegion> {
        self.region.as_ref()
    }

    pub fn shape(&self) -> CropShape {
        self.shape
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    /// Propose a new region.
    ///
    /// Returns the region in effect afterwards: the constrained candidate, or
    /// the previous region if the candidate was degenerate.
    pub fn set_crop(&mut self, candidate: CropRect) -> Option<CropRegion> {
        match self.constrain(candidate) {
            Some(region) => self.region = Some(region),
            None => log::debug!("rejected degenerate crop candidate {candidate:?}"),
        }
        self.region
    }

    /// Drop the current selection.
    pub fn clear(&mut self) {
        self.region = None;
    }

    /// Replace the selection with the default centred region.
    ///
    /// Clears the selection when the image is too narrow or too wide for
    /// any region of the fixed aspect ratio.
    pub fn reset_to_default(&mut self) {
        self.region = self.default_region();
        if self.region.is_none() {
            log::debug!(
                "no crop of aspect {:?} fits a {}x{} display",
                self.aspect_ratio,
                self.display.width,
                self.display.height
            );
        }
    }

    /// Update the on-screen size of the image.
    ///
    /// The percentage region is kept and the aspect constraint re-applied,
    /// since a fixed ratio is measured in displayed pixels. A region that
    /// no longer fits falls back to the default one.
    pub fn set_display_size(&mut self, display: DisplaySize) {
        self.display = display;
        if let Some(region) = self.region {
            match self.constrain(region.rect()) {
                Some(refitted) => self.region = Some(refitted),
                None => self.reset_to_default(),
            }
        }
    }

    fn default_region(&self) -> Option<CropRegion> {
        let inset = (100.0 - DEFAULT_CROP_PERCENT) / 2.0;
        let candidate = CropRect::new(inset, inset, DEFAULT_CROP_PERCENT, DEFAULT_CROP_PERCENT);
        self.constrain(candidate).map(|mut region| {
            region.x = (100.0 - region.width) / 2.0;
            region.y = (100.0 - region.height) / 2.0;
            region
        })
    }

    fn constrain(&self, candidate: CropRect) -> Option<CropRegion> {
        if !candidate.is_finite() {
            return None;
        }

        let CropRect {
            mut x,
            mut y,
            mut width,
            mut height,
        } = candidate;

        // Dragging up/left produces negative extents
        if width < 0.0 {
            x += width;
            width = -width;
        }
        if height < 0.0 {
            y += height;
            height = -height;
        }

        let left = x.clamp(0.0, 100.0);
        let top = y.clamp(0.0, 100.0);
        let right = (x + width).clamp(0.0, 100.0);
        let bottom = (y + height).clamp(0.0, 100.0);
        let mut width = right - left;
        let mut height = bottom - top;

        if width <= MIN_CROP_PERCENT || height <= MIN_CROP_PERCENT {
            return None;
        }

        if let Some(aspect) = self.aspect_ratio {
            (width, height) = fit_aspect(width, height, aspect, self.display);
            if width <= MIN_CROP_PERCENT || height <= MIN_CROP_PERCENT {
                return None;
            }
        }

        Some(CropRegion {
            x: left,
            y: top,
            width,
            height,
            shape: self.shape,
            aspect_ratio: self.aspect_ratio,
        })
    }
}

/// Shrink the non-conforming side so the displayed-pixel ratio equals `aspect`.
fn fit_aspect(width: f64, height: f64, aspect: f64, display: DisplaySize) -> (f64, f64) {
    let (display_w, display_h) = if display.is_valid() {
        (display.width, display.height)
    } else {
        (1.0, 1.0)
    };

    let width_px = width * display_w;
    let height_px = height * display_h;
    let current = width_px / height_px;

    if current > aspect {
        (height_px * aspect / display_w, height)
    } else if current < aspect {
        (width, width_px / aspect / display_h)
    } else {
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_display() -> DisplaySize {
        DisplaySize::new(400.0, 400.0)
    }

    fn assert_invariants(region: &CropRegion) {
        assert!(region.x >= 0.0 && region.y >= 0.0, "{region:?}");
        assert!(region.width > 0.0 && region.height > 0.0, "{region:?}");
        assert!(region.x + region.width <= 100.0 + 1e-9, "{region:?}");
        assert!(region.y + region.height <= 100.0 + 1e-9, "{region:?}");
    }

    #[test]
    fn test_new_has_no_region() {
        let selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        assert!(selector.region().is_none());
    }

    #[test]
    fn test_set_crop_within_bounds_is_unchanged() {
        let mut selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        let region = selector.set_crop(CropRect::new(10.0, 20.0, 30.0, 40.0)).unwrap();
        assert_eq!(region.rect(), CropRect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(region.shape, CropShape::Rectangular);
    }

    #[test]
    fn test_set_crop_clips_to_image() {
        let mut selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        let region = selector.set_crop(CropRect::new(-10.0, 80.0, 50.0, 50.0)).unwrap();
        assert_eq!(region.rect(), CropRect::new(0.0, 80.0, 40.0, 20.0));
    }

    #[test]
    fn test_negative_drag_is_normalized() {
        let mut selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        let region = selector.set_crop(CropRect::new(60.0, 60.0, -20.0, -30.0)).unwrap();
        assert_eq!(region.rect(), CropRect::new(40.0, 30.0, 20.0, 30.0));
    }

    #[test]
    fn test_degenerate_candidate_keeps_previous() {
        let mut selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        let first = selector.set_crop(CropRect::new(10.0, 10.0, 50.0, 50.0));

        let after = selector.set_crop(CropRect::new(10.0, 10.0, 0.5, 50.0));
        assert_eq!(after, first);

        let after = selector.set_crop(CropRect::new(10.0, 10.0, 50.0, 1.0));
        assert_eq!(after, first);
    }

    #[test]
    fn test_degenerate_first_candidate_leaves_none() {
        let mut selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        assert!(selector.set_crop(CropRect::new(0.0, 0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_out_of_bounds_candidate_rejected() {
        let mut selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        assert!(selector
            .set_crop(CropRect::new(150.0, 150.0, 20.0, 20.0))
            .is_none());
    }

    #[test]
    fn test_non_finite_candidate_rejected() {
        let mut selector = CropSelector::new(CropShape::Rectangular, None, square_display());
        assert!(selector
            .set_crop(CropRect::new(f64::NAN, 0.0, 20.0, 20.0))
            .is_none());
    }

    #[test]
    fn test_aspect_ratio_shrinks_width() {
        // 4:3 display, square aspect: 50% x 50% is 250x187.5 px on screen
        let mut selector =
            CropSelector::new(CropShape::Elliptical, Some(1.0), DisplaySize::new(500.0, 375.0));
        let region = selector.set_crop(CropRect::new(25.0, 25.0, 50.0, 50.0)).unwrap();

        assert!((region.width - 37.5).abs() < 1e-9);
        assert!((region.height - 50.0).abs() < 1e-9);
        assert_eq!((region.x, region.y), (25.0, 25.0));
    }

    #[test]
    fn test_aspect_ratio_shrinks_height() {
        let mut selector = CropSelector::new(CropShape::Rectangular, Some(2.0), square_display());
        let region = selector.set_crop(CropRect::new(0.0, 0.0, 40.0, 60.0)).unwrap();
        assert!((region.width - 40.0).abs() < 1e-9);
        assert!((region.height - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_fit_can_make_candidate_degenerate() {
        let mut selector = CropSelector::new(CropShape::Rectangular, Some(100.0), square_display());
        assert!(selector
            .set_crop(CropRect::new(0.0, 0.0, 50.0, 50.0))
            .is_none());
    }

    #[test]
    fn test_default_region_is_centered() {
        let selector = CropSelector::with_default_region(CropShape::Rectangular, None, square_display());
        let region = selector.region().unwrap();
        assert_eq!(region.rect(), CropRect::new(5.0, 5.0, 90.0, 90.0));
    }

    #[test]
    fn test_default_region_respects_aspect() {
        let display = DisplaySize::new(800.0, 400.0);
        let selector = CropSelector::with_default_region(CropShape::Elliptical, Some(1.0), display);
        let region = selector.region().unwrap();

        let ratio = (region.width * display.width) / (region.height * display.height);
        assert!((ratio - 1.0).abs() < 1e-9);
        assert!((region.x + region.width / 2.0 - 50.0).abs() < 1e-9);
        assert!((region.y + region.height / 2.0 - 50.0).abs() < 1e-9);
        assert_invariants(region);
    }

    #[test]
    fn test_full_image_ignores_aspect() {
        let selector = CropSelector::full_image(CropShape::Rectangular, DisplaySize::new(300.0, 100.0));
        assert_eq!(selector.region().unwrap().rect(), CropRect::full());
        assert_eq!(selector.aspect_ratio(), None);
    }

    #[test]
    fn test_clear_removes_region() {
        let mut selector = CropSelector::with_default_region(CropShape::Rectangular, None, square_display());
        selector.clear();
        assert!(selector.region().is_none());
    }

    #[test]
    fn test_display_resize_refits_aspect() {
        let mut selector = CropSelector::new(CropShape::Rectangular, Some(1.0), square_display());
        selector.set_crop(CropRect::new(0.0, 0.0, 50.0, 50.0));

        selector.set_display_size(DisplaySize::new(800.0, 400.0));
        let region = selector.region().unwrap();
        assert!((region.width * 800.0 - region.height * 400.0).abs() < 1e-6);
        assert_invariants(region);
    }

    #[test]
    fn test_display_resize_falls_back_to_default_when_refit_too_small() {
        let mut selector =
            CropSelector::new(CropShape::Rectangular, Some(1.0), DisplaySize::new(100.0, 100.0));
        selector.set_crop(CropRect::new(10.0, 10.0, 1.5, 1.5)).unwrap();

        let display = DisplaySize::new(400.0, 100.0);
        selector.set_display_size(display);
        let region = selector.region().unwrap();

        let ratio = (region.width * display.width) / (region.height * display.height);
        assert!((ratio - 1.0).abs() < 1e-9, "ratio {ratio}");
        assert!((region.height - 90.0).abs() < 1e-9);
        assert_invariants(region);
    }

    #[test]
    fn test_unreachable_aspect_has_no_default() {
        let selector = CropSelector::with_default_region(
            CropShape::Elliptical,
            Some(1.0),
            DisplaySize::natural(12000, 100),
        );
        assert!(selector.region().is_none());

        let free = CropSelector::with_default_region(
            CropShape::Rectangular,
            None,
            DisplaySize::natural(12000, 100),
        );
        assert_eq!(free.region().unwrap().rect(), CropRect::new(5.0, 5.0, 90.0, 90.0));
    }

    #[test]
    fn test_display_resize_clears_when_nothing_fits() {
        let mut selector =
            CropSelector::with_default_region(CropShape::Rectangular, Some(1.0), square_display());
        selector.set_display_size(DisplaySize::new(12000.0, 100.0));
        assert!(selector.region().is_none());
    }

    #[test]
    fn test_invalid_aspect_is_ignored() {
        let selector = CropSelector::new(CropShape::Rectangular, Some(-1.0), square_display());
        assert_eq!(selector.aspect_ratio(), None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
