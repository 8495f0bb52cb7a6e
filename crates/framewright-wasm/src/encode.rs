//! Image encoding WASM bindings.
//!
//! ```typescript
//! import { encode_image } from '@framewright/wasm';
//!
//! const bytes = encode_image(image, 'jpeg', 0.92);
//! const blob = new Blob([bytes], { type: 'image/jpeg' });
//! ```

use crate::types::{format_from_str, js_error, JsDecodedImage};
use framewright_core::encode;
use wasm_bindgen::prelude::*;

/// Encode an image as "jpeg", "png" or "webp".
///
/// `quality` is 0..1 and only affects JPEG. Transparent pixels are flattened
/// onto black for JPEG.
///
/// # Errors
///
/// Returns an error for an unknown format, a mismatched pixel buffer or a
/// zero-sized image.
#[wasm_bindgen]
pub fn encode_image(image: &JsDecodedImage, format: &str, quality: f32) -> Result<Vec<u8>, JsValue> {
    let format = format_from_str(format).map_err(js_error)?;
    let decoded = image.to_decoded().map_err(js_error)?;
    encode::encode(&decoded, format, quality).map_err(js_error)
}

/// MIME type for a format name, e.g. for building a `Blob`.
#[wasm_bindgen]
pub fn mime_type(format: &str) -> Option<String> {
    encode::ExportFormat::parse(format).map(|f| f.mime_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_markers() {
        let img = JsDecodedImage::new(8, 8, vec![128u8; 8 * 8 * 4]);
        let bytes = encode_image(&img, "jpg", 0.9).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_webp_header() {
        let img = JsDecodedImage::new(4, 4, vec![200u8; 4 * 4 * 4]);
        let bytes = encode_image(&img, "webp", 1.0).unwrap();
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("PNG").as_deref(), Some("image/png"));
        assert_eq!(mime_type("bmp"), None);
    }
}
