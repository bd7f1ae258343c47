//! Zoom and rotation parameters driven by the editor controls.

use serde::{Deserialize, Serialize};

use crate::config::{MAX_SCALE, MIN_SCALE};

/// Zoom factor and rotation angle for one render.
///
/// Rotation is stored unnormalized so repeated increments stay associative;
/// it is reduced modulo 360 only when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformParams {
    pub scale: f64,
    pub rotation_degrees: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_degrees: 0.0,
        }
    }
}

impl TransformParams {
    pub fn new(scale: f64, rotation_degrees: f64) -> Self {
        Self {
            scale,
            rotation_degrees,
        }
    }

    /// Scale clamped to the supported zoom range (1.0 if not finite).
    pub fn clamped_scale(&self) -> f64 {
        clamp_scale(self.scale)
    }

    /// Rotation reduced to `[0, 360)` via `((r % 360) + 360) % 360`.
    pub fn normalized_rotation(&self) -> f64 {
        normalize_degrees(self.rotation_degrees)
    }

    /// True when rendering would be a plain crop-and-copy.
    ///
    /// Only exact zero rotation and exact unit scale qualify; angles that are
    /// merely close to a right angle always take the general path.
    pub fn is_identity(&self) -> bool {
        self.normalized_rotation() == 0.0 && self.clamped_scale() == 1.0
    }
}

/// Clamp a zoom factor to `[MIN_SCALE, MAX_SCALE]`.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        1.0
    }
}

/// Reduce an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let normalized = ((degrees % 360.0) + 360.0) % 360.0;
    // -0.0 and 360.0 (from tiny negatives) both mean no rotation
    if normalized == 0.0 || normalized == 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Owns the zoom/rotation of one editing session.
#[derive(Debug, Clone, Default)]
pub struct TransformState {
    params: TransformParams,
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> TransformParams {
        self.params
    }

    pub fn scale(&self) -> f64 {
        self.params.scale
    }

    pub fn rotation(&self) -> f64 {
        self.params.rotation_degrees
    }

    /// Set the zoom factor, clamped to `[0.5, 2.0]`. Non-finite input is ignored.
    pub fn set_scale(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            self.params.scale = clamp_scale(value);
        }
        self.params.scale
    }

    /// Adjust the zoom factor by `delta`, clamped like [`set_scale`](Self::set_scale).
    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        self.set_scale(self.params.scale + delta)
    }

    /// Accumulate rotation. Non-finite input is ignored.
    pub fn rotate_by(&mut self, delta_degrees: f64) -> f64 {
        if delta_degrees.is_finite() {
            self.params.rotation_degrees += delta_degrees;
        }
        self.params.rotation_degrees
    }

    /// Back to 1.0x, no rotation.
    pub fn reset(&mut self) {
        self.params = TransformParams::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ROTATION_STEP_DEGREES;

    #[test]
    fn test_defaults() {
        let state = TransformState::new();
        assert_eq!(state.scale(), 1.0);
        assert_eq!(state.rotation(), 0.0);
        assert!(state.params().is_identity());
    }

    #[test]
    fn test_set_scale_clamps() {
        let mut state = TransformState::new();
        assert_eq!(state.set_scale(3.0), 2.0);
        assert_eq!(state.set_scale(0.1), 0.5);
        assert_eq!(state.set_scale(1.25), 1.25);
    }

    #[test]
    fn test_set_scale_ignores_nan() {
        let mut state = TransformState::new();
        state.set_scale(1.5);
        assert_eq!(state.set_scale(f64::NAN), 1.5);
    }

    #[test]
    fn test_zoom_by() {
        let mut state = TransformState::new();
        state.zoom_by(0.1);
        assert!((state.scale() - 1.1).abs() < 1e-12);
        state.zoom_by(5.0);
        assert_eq!(state.scale(), 2.0);
    }

    #[test]
    fn test_rotation_accumulates_unnormalized() {
        let mut state = TransformState::new();
        for _ in 0..5 {
            state.rotate_by(ROTATION_STEP_DEGREES);
        }
        assert_eq!(state.rotation(), 450.0);
        assert_eq!(state.params().normalized_rotation(), 90.0);
    }

    #[test]
    fn test_negative_rotation_normalizes() {
        let mut state = TransformState::new();
        state.rotate_by(-90.0);
        assert_eq!(state.params().normalized_rotation(), 270.0);
    }

    #[test]
    fn test_four_quarter_turns_are_identity() {
        let mut state = TransformState::new();
        for _ in 0..4 {
            state.rotate_by(90.0);
        }
        assert_eq!(state.params().normalized_rotation(), 0.0);
        assert!(state.params().is_identity());
    }

    #[test]
    fn test_reset() {
        let mut state = TransformState::new();
        state.set_scale(1.8);
        state.rotate_by(33.0);
        state.reset();
        assert_eq!(state.params(), TransformParams::default());
    }

    #[test]
    fn test_near_zero_rotation_is_not_identity() {
        let params = TransformParams::new(1.0, 1e-9);
        assert!(!params.is_identity());
        let params = TransformParams::new(1.0, 359.999_999);
        assert!(!params.is_identity());
    }

    #[test]
    fn test_clamped_scale_handles_programmatic_values() {
        assert_eq!(TransformParams::new(10.0, 0.0).clamped_scale(), 2.0);
        assert_eq!(TransformParams::new(f64::INFINITY, 0.0).clamped_scale(), 1.0);
    }

    #[test]
    fn test_normalize_degrees_edge_values() {
        assert_eq!(normalize_degrees(-0.0), 0.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(-720.0), 0.0);
        assert_eq!(normalize_degrees(f64::NAN), 0.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: set_scale always lands in the supported range.
        #[test]
        fn prop_scale_always_in_range(value in -100.0f64..=100.0) {
            let mut state = TransformState::new();
            let scale = state.set_scale(value);
            prop_assert!((MIN_SCALE..=MAX_SCALE).contains(&scale));
        }

        /// Property: normalized rotation is always in [0, 360).
        #[test]
        fn prop_normalized_rotation_in_range(deltas in prop::collection::vec(-1000.0f64..=1000.0, 0..30)) {
            let mut state = TransformState::new();
            for delta in deltas {
                state.rotate_by(delta);
            }
            let normalized = state.params().normalized_rotation();
            prop_assert!((0.0..360.0).contains(&normalized), "got {}", normalized);
        }
    }
}
