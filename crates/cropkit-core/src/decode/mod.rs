//! Source image decoding.
//!
//! Turns the bytes of a user-selected file into an upright, natural-resolution
//! RGBA raster. Decoding is synchronous; on the web it runs inside the WASM
//! module before the editor opens.

mod source;
mod types;

pub use source::{decode_source, extract_orientation};
pub use types::{DecodeError, Orientation, SourceImage};
