//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode JPEG, PNG or WebP bytes to RGBA
//! - [`resize`] - Resize an image to exact dimensions
//! - [`resize_to_fit`] - Resize an image to fit within a max edge
//! - [`generate_thumbnail`] - Generate a thumbnail for the photo grid
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, resize_to_fit } from '@framewright/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const preview = resize_to_fit(image, 2560, 2); // Lanczos3 filter
//! ```

use crate::types::{filter_from_u8, js_error, JsDecodedImage};
use framewright_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image file from bytes.
///
/// JPEG EXIF orientation is applied, so the result is upright.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported, intact image.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Resize an image to exact dimensions.
///
/// `filter`: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3.
#[wasm_bindgen]
pub fn resize(
    image: &JsDecodedImage,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    let decoded = image.to_decoded().map_err(js_error)?;
    decode::resize(&decoded, width, height, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Resize so the longest edge is at most `max_edge`, preserving aspect
/// ratio. Images that already fit come back unchanged.
#[wasm_bindgen]
pub fn resize_to_fit(image: &JsDecodedImage, max_edge: u32, filter: u8) -> Result<JsDecodedImage, JsValue> {
    let decoded = image.to_decoded().map_err(js_error)?;
    decode::resize_to_fit(&decoded, max_edge, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Thumbnail that fits within a `size x size` box (bilinear).
#[wasm_bindgen]
pub fn generate_thumbnail(image: &JsDecodedImage, size: u32) -> Result<JsDecodedImage, JsValue> {
    let decoded = image.to_decoded().map_err(js_error)?;
    decode::generate_thumbnail(&decoded, size)
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}
