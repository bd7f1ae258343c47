//! Host-provided object storage.
//!
//! The page passes in any object implementing the `CropkitStorage`
//! interface below. `upload` resolves with the stored path (a string or
//! `{ path }`) and rejects with `{ message, statusCode? }`. A thin wrapper
//! around the Supabase storage client that throws its `error` fits.

use async_trait::async_trait;
use bytes::Bytes;
use cropkit_core::upload::{ObjectStorage, RawStorageError, UploadOptions};
use js_sys::{Promise, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(typescript_custom_section)]
const STORAGE_INTERFACE: &str = r#"
export interface CropkitStorage {
  upload(bucket: string, path: string, bytes: Uint8Array,
         options: { contentType: string; cacheControl: string; upsert: boolean }): Promise<string | { path: string }>;
  getPublicUrl(bucket: string, path: string): string;
}
"#;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "CropkitStorage")]
    pub type JsStorage;

    #[wasm_bindgen(method, catch, js_name = upload)]
    fn upload_object(
        this: &JsStorage,
        bucket: &str,
        path: &str,
        bytes: Uint8Array,
        options: JsValue,
    ) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, js_name = getPublicUrl)]
    fn get_public_url(this: &JsStorage, bucket: &str, path: &str) -> String;
}

#[async_trait(?Send)]
impl ObjectStorage for JsStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        options: &UploadOptions,
    ) -> Result<String, RawStorageError> {
        let options = serde_wasm_bindgen::to_value(options)
            .map_err(|e| RawStorageError::new(e.to_string()))?;
        let array = Uint8Array::from(bytes.as_ref());

        let promise = self
            .upload_object(bucket, path, array, options)
            .map_err(|e| raw_error(&e))?;
        let stored = JsFuture::from(promise).await.map_err(|e| raw_error(&e))?;

        Ok(stored_path(&stored).unwrap_or_else(|| path.to_string()))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.get_public_url(bucket, path)
    }
}

fn property(value: &JsValue, key: &str) -> Option<JsValue> {
    if !value.is_object() {
        return None;
    }
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// The path a storage call resolved with: a string or `{ path }`.
fn stored_path(value: &JsValue) -> Option<String> {
    value
        .as_string()
        .or_else(|| property(value, "path").and_then(|p| p.as_string()))
}

/// Read `message` and `statusCode`/`status` off whatever the host rejected with.
fn raw_error(value: &JsValue) -> RawStorageError {
    let message = property(value, "message")
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "Unknown storage error".to_string());

    let status = ["statusCode", "status"]
        .iter()
        .filter_map(|key| property(value, key))
        .find_map(|v| {
            v.as_f64()
                .map(|n| n as u16)
                .or_else(|| v.as_string().and_then(|s| s.trim().parse().ok()))
        });

    RawStorageError { message, status }
}
