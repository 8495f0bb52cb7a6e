//! Adjustment WASM bindings.
//!
//! [`JsAdjustments`] mirrors the six sliders so TypeScript can build values
//! to hand to the editor, and [`apply_adjustments`] filters a standalone
//! image on the CPU.

use crate::types::{js_error, JsDecodedImage};
use framewright_core::adjustments::apply_all_adjustments;
use framewright_core::Adjustments;
use wasm_bindgen::prelude::*;

/// Tone and color adjustments for JavaScript. Every field ranges -100 to 100.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsAdjustments {
    inner: Adjustments,
}

#[wasm_bindgen]
impl JsAdjustments {
    /// All sliders at zero (the identity).
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    #[wasm_bindgen(getter)]
    pub fn exposure(&self) -> f32 {
        self.inner.exposure
    }

    #[wasm_bindgen(setter)]
    pub fn set_exposure(&mut self, value: f32) {
        self.inner.exposure = value;
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.contrast = value;
    }

    /// Positive is warmer.
    #[wasm_bindgen(getter)]
    pub fn temperature(&self) -> f32 {
        self.inner.temperature
    }

    #[wasm_bindgen(setter)]
    pub fn set_temperature(&mut self, value: f32) {
        self.inner.temperature = value;
    }

    /// Positive is more magenta.
    #[wasm_bindgen(getter)]
    pub fn tint(&self) -> f32 {
        self.inner.tint
    }

    #[wasm_bindgen(setter)]
    pub fn set_tint(&mut self, value: f32) {
        self.inner.tint = value;
    }

    #[wasm_bindgen(getter)]
    pub fn vibrance(&self) -> f32 {
        self.inner.vibrance
    }

    #[wasm_bindgen(setter)]
    pub fn set_vibrance(&mut self, value: f32) {
        self.inner.vibrance = value;
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.saturation = value;
    }

    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to a plain object for storage.
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize from a plain object; missing fields default to 0.
    pub fn from_json(value: JsValue) -> Result<JsAdjustments, JsValue> {
        let inner: Adjustments = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        Ok(Self { inner })
    }
}

impl JsAdjustments {
    pub(crate) fn inner(&self) -> Adjustments {
        self.inner.clamped()
    }
}

impl From<Adjustments> for JsAdjustments {
    fn from(inner: Adjustments) -> Self {
        Self { inner }
    }
}

/// Apply adjustments to a copy of `image` on the CPU.
#[wasm_bindgen]
pub fn apply_adjustments(image: &JsDecodedImage, adjustments: &JsAdjustments) -> Result<JsDecodedImage, JsValue> {
    let mut decoded = image.to_decoded().map_err(js_error)?;
    apply_all_adjustments(&mut decoded.pixels, &adjustments.inner());
    Ok(JsDecodedImage::from_decoded(decoded))
}
