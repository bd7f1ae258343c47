//! The crop-and-upload session exposed to JavaScript.
//!
//! # Example
//!
//! ```typescript
//! import { CropSession } from '@cropkit/wasm';
//!
//! const session = CropSession.avatar('public-media', storage);
//! session.onUploaded((url) => saveProfile(url));
//! session.onError((err) => toast(err.message));
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! await session.selectFile(file.name, file.type, bytes);
//! session.setDisplaySize(img.clientWidth, img.clientHeight);
//! session.setCrop(10, 10, 60, 60);
//! session.rotateStep(true);
//! const url = await session.commit();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use cropkit_core::crop::{CropRect, DisplaySize};
use cropkit_core::upload::UploadJob;
use cropkit_core::{PipelineError, SelectedFile, UploadCoordinator, UploadTarget};
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::preview::BlobPreviews;
use crate::storage::JsStorage;
use crate::types::{to_js_error, JsRaster, SessionSnapshot};

/// Host callbacks, invoked only after the coordinator borrow is released so
/// a callback may call back into the session.
#[derive(Default)]
struct Callbacks {
    on_uploaded: RefCell<Option<Function>>,
    on_error: RefCell<Option<Function>>,
}

impl Callbacks {
    fn uploaded(&self, url: &str) {
        let callback = self.on_uploaded.borrow().clone();
        if let Some(callback) = callback {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(url)) {
                log::warn!("onUploaded callback threw: {err:?}");
            }
        }
    }

    fn error(&self, error: &JsValue) {
        let callback = self.on_error.borrow().clone();
        if let Some(callback) = callback {
            if let Err(err) = callback.call1(&JsValue::NULL, error) {
                log::warn!("onError callback threw: {err:?}");
            }
        }
    }
}

#[wasm_bindgen(js_name = CropSession)]
pub struct JsCropSession {
    inner: Rc<RefCell<UploadCoordinator<BlobPreviews>>>,
    storage: Rc<JsStorage>,
    callbacks: Rc<Callbacks>,
}

#[wasm_bindgen(js_class = CropSession)]
impl JsCropSession {
    /// Create a session from an upload target object, e.g.
    /// `{ bucket, folder, bounds: { maxWidth, maxHeight }, shape, aspectRatio }`.
    #[wasm_bindgen(constructor)]
    pub fn new(target: JsValue, storage: JsStorage) -> Result<JsCropSession, JsValue> {
        let target: UploadTarget =
            serde_wasm_bindgen::from_value(target).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::with_target(target, storage))
    }

    /// Square elliptical profile picture, at most 400x400.
    pub fn avatar(bucket: &str, storage: JsStorage) -> JsCropSession {
        Self::with_target(UploadTarget::avatar(bucket), storage)
    }

    /// Company logo, at most 600x600.
    pub fn logo(bucket: &str, storage: JsStorage) -> JsCropSession {
        Self::with_target(UploadTarget::logo(bucket), storage)
    }

    #[wasm_bindgen(js_name = onUploaded)]
    pub fn on_uploaded(&self, callback: Function) {
        *self.callbacks.on_uploaded.borrow_mut() = Some(callback);
    }

    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&self, callback: Function) {
        *self.callbacks.on_error.borrow_mut() = Some(callback);
    }

    /// Lifecycle state: `idle`, `fileSelected`, `editing`, `processing`,
    /// `uploaded` or `failed`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.inner.borrow().state().as_str().to_string()
    }

    #[wasm_bindgen(getter, js_name = previewUrl)]
    pub fn preview_url(&self) -> Option<String> {
        self.inner
            .borrow()
            .session()
            .and_then(|s| s.preview_url())
            .map(str::to_string)
    }

    #[wasm_bindgen(getter, js_name = uploadedUrl)]
    pub fn uploaded_url(&self) -> Option<String> {
        self.inner.borrow().uploaded_url().map(str::to_string)
    }

    /// State, crop, zoom, rotation and last error as a plain object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let inner = self.inner.borrow();
        let snapshot = SessionSnapshot::capture(&*inner);
        serde_wasm_bindgen::to_value(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Validate and open a selected file.
    ///
    /// Resolves with `undefined` when the editor opens, or with the public
    /// URL when the target skips the editor and the upload finished.
    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(&self, name: String, mime_type: String, bytes: Vec<u8>) -> Promise {
        let begun = self
            .inner
            .borrow_mut()
            .select_file(SelectedFile::new(name, mime_type, bytes));
        self.run(begun)
    }

    /// Propose a crop in percentages. Returns the region in effect afterwards.
    #[wasm_bindgen(js_name = setCrop)]
    pub fn set_crop(&self, x: f64, y: f64, width: f64, height: f64) -> Result<JsValue, JsValue> {
        let result = self
            .inner
            .borrow_mut()
            .set_crop(CropRect::new(x, y, width, height));
        let region = self.settle(result)?;
        serde_wasm_bindgen::to_value(&region).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = clearCrop)]
    pub fn clear_crop(&self) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().clear_crop();
        self.settle(result)
    }

    #[wasm_bindgen(js_name = resetCrop)]
    pub fn reset_crop(&self) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().reset_crop();
        self.settle(result)
    }

    /// Report the on-screen size of the image in CSS pixels.
    #[wasm_bindgen(js_name = setDisplaySize)]
    pub fn set_display_size(&self, width: f64, height: f64) -> Result<(), JsValue> {
        let result = self
            .inner
            .borrow_mut()
            .set_display_size(DisplaySize::new(width, height));
        self.settle(result)
    }

    #[wasm_bindgen(js_name = setPixelDensity)]
    pub fn set_pixel_density(&self, density: f64) {
        self.inner.borrow_mut().set_pixel_density(density);
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&self, value: f64) -> Result<f64, JsValue> {
        let result = self.inner.borrow_mut().set_scale(value);
        self.settle(result)
    }

    #[wasm_bindgen(js_name = zoomBy)]
    pub fn zoom_by(&self, delta: f64) -> Result<f64, JsValue> {
        let result = self.inner.borrow_mut().zoom_by(delta);
        self.settle(result)
    }

    #[wasm_bindgen(js_name = rotateBy)]
    pub fn rotate_by(&self, degrees: f64) -> Result<f64, JsValue> {
        let result = self.inner.borrow_mut().rotate_by(degrees);
        self.settle(result)
    }

    /// Rotate 90 degrees, clockwise unless `clockwise` is false.
    #[wasm_bindgen(js_name = rotateStep)]
    pub fn rotate_step(&self, clockwise: bool) -> Result<f64, JsValue> {
        let result = self.inner.borrow_mut().rotate_step(clockwise);
        self.settle(result)
    }

    #[wasm_bindgen(js_name = resetTransform)]
    pub fn reset_transform(&self) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().reset_transform();
        self.settle(result)
    }

    /// Render the current edit for a live preview canvas.
    #[wasm_bindgen(js_name = renderPreview)]
    pub fn render_preview(&self) -> Result<JsRaster, JsValue> {
        let result = self.inner.borrow_mut().render_current();
        self.settle(result).map(JsRaster::from)
    }

    /// Render, encode and upload the current edit.
    ///
    /// Resolves with the public URL, or with `undefined` if an upload was
    /// already in flight.
    pub fn commit(&self) -> Promise {
        let begun = self.inner.borrow_mut().begin_commit();
        self.run(begun)
    }

    /// Go back to the editor after a failed upload.
    #[wasm_bindgen(js_name = retryEdit)]
    pub fn retry_edit(&self) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().retry_edit();
        self.settle(result)
    }

    pub fn cancel(&self) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().cancel();
        self.settle(result)
    }
}

impl JsCropSession {
    fn with_target(target: UploadTarget, storage: JsStorage) -> Self {
        log::debug!("new session for bucket {}", target.bucket);
        Self {
            inner: Rc::new(RefCell::new(UploadCoordinator::new(target, BlobPreviews))),
            storage: Rc::new(storage),
            callbacks: Rc::new(Callbacks::default()),
        }
    }

    fn settle<T>(&self, result: Result<T, PipelineError>) -> Result<T, JsValue> {
        result.map_err(|err| {
            let error = to_js_error(&err);
            self.callbacks.error(&error);
            error
        })
    }

    /// Execute a prepared upload, if any, and feed the outcome back.
    fn run(&self, begun: Result<Option<UploadJob>, PipelineError>) -> Promise {
        let job = match self.settle(begun) {
            Ok(Some(job)) => job,
            Ok(None) => return Promise::resolve(&JsValue::UNDEFINED),
            Err(error) => return Promise::reject(&error),
        };

        let inner = Rc::clone(&self.inner);
        let storage = Rc::clone(&self.storage);
        let callbacks = Rc::clone(&self.callbacks);
        future_to_promise(async move {
            let outcome = job.execute(&*storage).await;
            let finished = inner.borrow_mut().finish_commit(outcome);
            match finished {
                Ok(url) => {
                    callbacks.uploaded(&url);
                    Ok(JsValue::from_str(&url))
                }
                Err(err) => {
                    let error = to_js_error(&err);
                    callbacks.error(&error);
                    Err(error)
                }
            }
        })
    }
}
