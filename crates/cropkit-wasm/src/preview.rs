//! Object URL previews.

use cropkit_core::session::{PreviewError, PreviewHandle, PreviewProvider};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, Url};

/// Creates `blob:` URLs for selected files and revokes them on release.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobPreviews;

impl PreviewProvider for BlobPreviews {
    fn acquire(&self, bytes: &[u8], mime_type: &str) -> Result<PreviewHandle, PreviewError> {
        let parts = Array::of1(&Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(preview_error)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(preview_error)?;
        log::debug!("created preview {url} ({} bytes)", bytes.len());

        Ok(PreviewHandle::new(url, |url| {
            if let Err(err) = Url::revoke_object_url(url) {
                log::warn!("failed to revoke {url}: {err:?}");
            }
        }))
    }
}

fn preview_error(value: JsValue) -> PreviewError {
    PreviewError(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_acquire_creates_blob_url() {
        let handle = BlobPreviews.acquire(&[1, 2, 3, 4], "image/png").unwrap();
        assert!(handle.url().starts_with("blob:"));
    }

    #[wasm_bindgen_test]
    fn test_drop_revokes_without_panicking() {
        let handle = BlobPreviews.acquire(&[0; 16], "image/jpeg").unwrap();
        drop(handle);
    }
}
