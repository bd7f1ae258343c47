//! Zoom/rotation state and the compositor that renders a crop with them.
//!
//! # Transform Order
//!
//! The compositor fills the output with the crop, then applies
//! `translate(center) -> rotate -> scale -> translate(-center)` so zoom and
//! rotation pivot around the crop's own center.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Drawing happens in logical units; the surface is pre-scaled by pixel density
//! - Origin is top-left corner

mod compositor;
mod sample;
mod state;

pub use compositor::{
    output_size, render, RenderError, RenderedRaster, Viewport, MAX_SURFACE_AREA,
    MAX_SURFACE_DIMENSION,
};
pub use state::{clamp_scale, normalize_degrees, TransformParams, TransformState};
