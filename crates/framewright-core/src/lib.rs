//! Framewright Core - non-destructive photo editing engine
//!
//! This crate provides the edit model, the geometric transform resolver, the
//! CPU side of the adjustment engine, the interaction state machine, the
//! snapshot history and the export compositor used by Framewright.

pub mod adjustments;
pub mod batch;
pub mod cache;
pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod engine;
pub mod export;
pub mod formula;
pub mod history;
pub mod interaction;
pub mod model;
pub mod transform;

pub use batch::{BatchError, BatchProgress, BatchRunner, BatchStep};
pub use cache::FilterCache;
pub use config::EditorConfig;
pub use editor::{BatchOp, EditError, EditPhase, Editor, ExportedFile, ImportReport};
pub use engine::{AdjustmentEngine, CpuBackend, EngineError, FilterBackend};
pub use export::{ExportError, ExportOptions, NamingScheme, ResizeSpec};
pub use history::History;
pub use model::{Collection, CropRect, ImageHandle, LogoId, LogoLayer, Photo, PhotoId, Rotation};

/// Lower bound of every adjustment slider.
pub const ADJUSTMENT_MIN: f32 = -100.0;
/// Upper bound of every adjustment slider.
pub const ADJUSTMENT_MAX: f32 = 100.0;

/// Tone and color adjustments for a photo.
///
/// All six fields share the range -100 to 100 and default to 0. The default
/// value is the identity: filtering with it leaves pixels untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Exposure (-100 to 100), 80 units per stop
    pub exposure: f32,
    /// Contrast (-100 to 100)
    pub contrast: f32,
    /// White balance temperature (-100 to 100), positive is warmer
    pub temperature: f32,
    /// White balance tint (-100 to 100), positive is more magenta
    pub tint: f32,
    /// Vibrance (-100 to 100)
    pub vibrance: f32,
    /// Saturation (-100 to 100)
    pub saturation: f32,
}

impl Adjustments {
    /// Create a new Adjustments with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Return a copy with every field clamped into range.
    ///
    /// Non-finite values collapse to 0 rather than to a bound.
    pub fn clamped(&self) -> Self {
        Self {
            exposure: clamp_field(self.exposure),
            contrast: clamp_field(self.contrast),
            temperature: clamp_field(self.temperature),
            tint: clamp_field(self.tint),
            vibrance: clamp_field(self.vibrance),
            saturation: clamp_field(self.saturation),
        }
    }

    /// Bit-exact key for hashing, used by the filter cache.
    pub fn cache_key(&self) -> [u32; 6] {
        let c = self.clamped();
        [
            c.exposure.to_bits(),
            c.contrast.to_bits(),
            c.temperature.to_bits(),
            c.tint.to_bits(),
            c.vibrance.to_bits(),
            c.saturation.to_bits(),
        ]
    }
}

#[inline]
fn clamp_field(value: f32) -> f32 {
    if value.is_finite() {
        // -0.0 would break bit-exact cache keys against the default
        let v = value.clamp(ADJUSTMENT_MIN, ADJUSTMENT_MAX);
        if v == 0.0 {
            0.0
        } else {
            v
        }
    } else {
        0.0
    }
}
