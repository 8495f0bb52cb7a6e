//! WASM-compatible wrapper types for image data.
//!
//! These types wrap the core Framewright types and handle the conversion
//! between Rust and JavaScript data representations.

use framewright_core::decode::{DecodedImage, FilterType};
use framewright_core::encode::ExportFormat;
use wasm_bindgen::prelude::*;

/// A decoded RGBA image for JavaScript.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` copies it into a
/// JavaScript `Uint8Array`; keep images in WASM memory where possible and
/// only extract pixels for display.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create an image from dimensions and RGBA pixel data (4 bytes per
    /// pixel, row-major). The data is not validated here; the editor checks
    /// it when the image is used.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data as a `Uint8Array` copy, ready for `ImageData`.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// Optional: wasm-bindgen's finalizer releases it as well.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Validated copy as a core image.
    pub(crate) fn to_decoded(&self) -> Result<DecodedImage, String> {
        DecodedImage::try_new(self.width, self.height, self.pixels.clone()).map_err(|e| e.to_string())
    }
}

/// Convert a u8 filter value to the core `FilterType`.
///
/// - 0 = Nearest
/// - 1 = Bilinear
/// - 2 = Lanczos3
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// Parse an export format name ("jpeg", "png", "webp").
pub(crate) fn format_from_str(name: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(name).ok_or_else(|| format!("unsupported export format: {name}"))
}

/// Error message to a JS value at the binding boundary.
pub(crate) fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
