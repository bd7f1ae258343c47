//! Cropkit WASM - WebAssembly bindings for Cropkit
//!
//! This crate exposes the cropkit-core upload pipeline to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `session` - The `CropSession` class driving select, edit and upload
//! - `storage` - Adapter for a host-provided storage client
//! - `preview` - `blob:` URL previews of selected files
//! - `types` - Rendered rasters, error objects and session snapshots
//! - `logger` - Routes pipeline logs to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { CropSession, setLogLevel } from '@cropkit/wasm';
//!
//! await init();
//! setLogLevel('debug');
//!
//! const session = CropSession.logo('public-media', storage);
//! await session.selectFile(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! const url = await session.commit();
//! ```

use wasm_bindgen::prelude::*;

mod logger;
mod preview;
mod session;
mod storage;
mod types;

pub use logger::set_log_level;
pub use preview::BlobPreviews;
pub use session::JsCropSession;
pub use storage::JsStorage;
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install();
    log::debug!("cropkit {} ready", version());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
