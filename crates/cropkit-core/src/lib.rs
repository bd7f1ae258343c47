//! Cropkit Core - crop, transform and upload pipeline
//!
//! This crate turns a user-selected image into a bounded, cropped, zoomed and
//! rotated JPEG and hands it to remote object storage, tracking the whole
//! interaction as an explicit session lifecycle.
//!
//! The pipeline:
//!
//! 1. [`validate`] and [`decode`] the selected file into a [`SourceImage`]
//! 2. Let the user pick a [`crop`] region and a zoom/rotation ([`transform`])
//! 3. Render the edit with the compositor, then [`encode`] it
//! 4. [`upload`] the encoded bytes under a fresh object name
//!
//! [`UploadCoordinator`] ties these together and owns the [`session`].

pub mod config;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod error;
pub mod session;
pub mod transform;
pub mod upload;
pub mod validate;

#[cfg(test)]
mod testing;

pub use config::{CropShape, OutputBounds, UploadTarget};
pub use crop::{CropRect, CropRegion, CropSelector, DisplaySize};
pub use decode::{decode_source, SourceImage};
pub use encode::{encode, EncodedAsset};
pub use error::PipelineError;
pub use session::{EditingSession, PreviewHandle, PreviewProvider, SessionState};
pub use transform::{render, RenderedRaster, TransformParams, TransformState, Viewport};
pub use upload::{ObjectStorage, UploadCoordinator, UploadEvents, UploadJob};
pub use validate::SelectedFile;
