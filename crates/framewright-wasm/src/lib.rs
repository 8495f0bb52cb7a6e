//! Framewright WASM - WebAssembly bindings for the Framewright editor
//!
//! # Module Structure
//!
//! - `editor` - The editing session: photos, geometry, overlays, history, export
//! - `adjustments` - Slider values and standalone CPU filtering
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding and resizing
//! - `encode` - Image encoding (JPEG, PNG, WebP)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor } from '@framewright/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const id = editor.import_file(file.name, bytes);
//! const jpeg = editor.export(id, { format: 'jpeg', quality: 0.9 });
//! ```
//!
//! The browser build always filters on the CPU; GPU acceleration lives in
//! the native `framewright-gpu` crate.

use wasm_bindgen::prelude::*;

mod adjustments;
mod decode;
mod editor;
mod encode;
mod types;

pub use adjustments::{apply_adjustments, JsAdjustments};
pub use decode::{decode_image, generate_thumbnail, resize, resize_to_fit};
pub use editor::JsEditor;
pub use encode::{encode_image, mime_type};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "framewright wasm loaded");
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
