//! JavaScript-facing value types.
//!
//! Plain data crosses the boundary as serde objects; rendered pixels stay in
//! a wasm-owned [`JsRaster`] until JavaScript asks for them.

use cropkit_core::crop::CropRegion;
use cropkit_core::session::PreviewProvider;
use cropkit_core::{PipelineError, RenderedRaster, UploadCoordinator};
use js_sys::Reflect;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A rendered preview of the current edit.
///
/// `pixels()` copies RGBA data into JavaScript memory, sized
/// `width * height * 4` in device pixels.
#[wasm_bindgen]
pub struct JsRaster {
    width: u32,
    height: u32,
    logical_width: u32,
    logical_height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRaster {
    /// Width in device pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in device pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width in CSS pixels
    #[wasm_bindgen(getter, js_name = logicalWidth)]
    pub fn logical_width(&self) -> u32 {
        self.logical_width
    }

    /// Height in CSS pixels
    #[wasm_bindgen(getter, js_name = logicalHeight)]
    pub fn logical_height(&self) -> u32 {
        self.logical_height
    }

    /// RGBA pixel data, ready for `new ImageData(...)`.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl From<RenderedRaster> for JsRaster {
    fn from(raster: RenderedRaster) -> Self {
        let (logical_width, logical_height) = raster.logical_dimensions();
        Self {
            width: raster.width(),
            height: raster.height(),
            logical_width,
            logical_height,
            pixels: raster.pixels().as_raw().clone(),
        }
    }
}

/// Error details attached to rejected promises and `onError` calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorInfo {
    pub code: &'static str,
    pub user_message: String,
    pub detail: String,
    pub retryable: bool,
}

impl From<&PipelineError> for ErrorInfo {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: err.code(),
            user_message: err.user_message(),
            detail: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// A JS `Error` whose message is user-facing, with `code`, `detail` and
/// `retryable` properties for programmatic handling.
pub(crate) fn to_js_error(err: &PipelineError) -> JsValue {
    let info = ErrorInfo::from(err);
    let error = js_sys::Error::new(&info.user_message);
    let props = [
        ("code", JsValue::from_str(info.code)),
        ("detail", JsValue::from_str(&info.detail)),
        ("retryable", JsValue::from_bool(info.retryable)),
    ];
    for (key, value) in props {
        if Reflect::set(&error, &JsValue::from_str(key), &value).is_err() {
            log::warn!("could not attach {key} to error");
        }
    }
    error.into()
}

/// Everything the UI needs to draw the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionSnapshot {
    pub state: &'static str,
    pub file_name: Option<String>,
    pub preview_url: Option<String>,
    pub natural_width: Option<u32>,
    pub natural_height: Option<u32>,
    pub region: Option<CropRegion>,
    pub scale: f64,
    pub rotation: f64,
    pub uploaded_url: Option<String>,
    pub error: Option<ErrorInfo>,
}

impl SessionSnapshot {
    pub(crate) fn capture<P: PreviewProvider>(coordinator: &UploadCoordinator<P>) -> Self {
        let session = coordinator.session();
        Self {
            state: coordinator.state().as_str(),
            file_name: session.map(|s| s.file_name().to_string()),
            preview_url: session
                .and_then(|s| s.preview_url())
                .map(str::to_string),
            natural_width: session.map(|s| s.source().natural_width()),
            natural_height: session.map(|s| s.source().natural_height()),
            region: session.and_then(|s| s.region().copied()),
            scale: session.map_or(1.0, |s| s.transform().scale()),
            rotation: session.map_or(0.0, |s| s.transform().rotation()),
            uploaded_url: coordinator.uploaded_url().map(str::to_string),
            error: coordinator.last_error().map(ErrorInfo::from),
        }
    }
}
