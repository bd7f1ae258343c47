//! The editing session: one decoded image and the edits applied to it.

use bytes::Bytes;

use crate::config::OutputBounds;
use crate::crop::{CropRect, CropRegion, CropSelector, DisplaySize};
use crate::decode::SourceImage;
use crate::encode::{encode, EncodedAsset};
use crate::error::PipelineError;
use crate::transform::{render, RenderError, RenderedRaster, TransformState, Viewport};

use super::preview::PreviewHandle;

/// Everything held while one selected image is being edited.
///
/// The decoded source, the crop selection, the zoom/rotation state, the
/// preview handle and the last encoded output all share this lifetime.
/// Dropping the session releases the preview.
#[derive(Debug)]
pub struct EditingSession {
    source: SourceImage,
    file_name: String,
    mime_type: String,
    file_bytes: Bytes,
    crop: CropSelector,
    transform: TransformState,
    preview: Option<PreviewHandle>,
    encoded: Option<EncodedAsset>,
}

impl EditingSession {
    pub fn new(
        source: SourceImage,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        file_bytes: Bytes,
        crop: CropSelector,
        preview: Option<PreviewHandle>,
    ) -> Self {
        Self {
            source,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            file_bytes,
            crop,
            transform: TransformState::new(),
            preview,
            encoded: None,
        }
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The originally selected file, kept so a preview can be re-created.
    pub fn file_bytes(&self) -> &[u8] {
        &self.file_bytes
    }

    pub fn crop(&self) -> &CropSelector {
        &self.crop
    }

    pub fn region(&self) -> Option<&CropRegion> {
        self.crop.region()
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }

    /// Encoded output from the last commit, if nothing was edited since.
    pub fn cached_asset(&self) -> Option<&EncodedAsset> {
        self.encoded.as_ref()
    }

    pub fn set_crop(&mut self, candidate: CropRect) -> Option<CropRegion> {
        self.invalidate();
        self.crop.set_crop(candidate)
    }

    pub fn clear_crop(&mut self) {
        self.invalidate();
        self.crop.clear();
    }

    pub fn reset_crop(&mut self) {
        self.invalidate();
        self.crop.reset_to_default();
    }

    pub fn set_display_size(&mut self, display: DisplaySize) {
        self.invalidate();
        self.crop.set_display_size(display);
    }

    pub fn set_scale(&mut self, value: f64) -> f64 {
        self.invalidate();
        self.transform.set_scale(value)
    }

    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        self.invalidate();
        self.transform.zoom_by(delta)
    }

    pub fn rotate_by(&mut self, delta_degrees: f64) -> f64 {
        self.invalidate();
        self.transform.rotate_by(delta_degrees)
    }

    pub fn reset_transform(&mut self) {
        self.invalidate();
        self.transform.reset();
    }

    /// Drop the cached output so the next commit re-renders.
    pub fn invalidate(&mut self) {
        if self.encoded.take().is_some() {
            log::trace!("cached output invalidated");
        }
    }

    pub fn render(
        &self,
        bounds: OutputBounds,
        pixel_density: f64,
    ) -> Result<RenderedRaster, RenderError> {
        let viewport = Viewport::new(self.crop.display(), pixel_density);
        render(
            &self.source,
            self.crop.region(),
            &self.transform.params(),
            bounds,
            &viewport,
        )
    }

    /// Render and encode, or reuse the cached output when nothing changed.
    pub fn encoded_asset(
        &mut self,
        bounds: OutputBounds,
        pixel_density: f64,
    ) -> Result<EncodedAsset, PipelineError> {
        if let Some(asset) = &self.encoded {
            log::debug!("reusing cached output ({} bytes)", asset.len());
            return Ok(asset.clone());
        }

        let raster = self.render(bounds, pixel_density)?;
        let asset = encode(&raster)?;
        self.encoded = Some(asset.clone());
        Ok(asset)
    }

    pub(crate) fn attach_preview(&mut self, preview: PreviewHandle) {
        self.preview = Some(preview);
    }

    /// Release the preview now. Returns false if none was held.
    pub fn release_preview(&mut self) -> bool {
        self.preview.take().is_some()
    }
}
