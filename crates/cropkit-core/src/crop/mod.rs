//! Crop selection.
//!
//! The crop is resolution-independent: it is stored as percentages of the
//! image as displayed in the editor, and only mapped to natural pixels when
//! the compositor renders.

mod region;
mod selector;

pub use region::{CropRect, CropRegion, DisplaySize, PixelRect};
pub use selector::CropSelector;
