//! The five-stage adjustment formula shared by the CPU and GPU paths.
//!
//! Both implementations derive their per-image coefficients from
//! [`FilterCoefficients::from_adjustments`], so the two paths can only
//! disagree in floating point precision, never in constants.
//!
//! ## Stage Order
//! 1. Exposure (with soft-knee highlight rolloff when brightening)
//! 2. Contrast (pivot around mid-gray)
//! 3. Temperature / tint (per-channel gains)
//! 4. Saturation (lerp from BT.709 luminance)
//! 5. Vibrance (saturation boost weighted toward muted pixels)
//!
//! ## Uniform Block
//!
//! [`FilterCoefficients::to_uniform_block`] packs the coefficients as four
//! `vec4<f32>` in normalized (0..1) color space:
//!
//! ```text
//! [0] exposure_gain, knee, knee_enabled, contrast_factor
//! [1] pivot, gain_r, gain_g, gain_b
//! [2] saturation_factor, vibrance, vibrance_distance_scale, 0
//! [3] luma_r, luma_g, luma_b, 0
//! ```

use crate::Adjustments;

/// Maximum 8-bit channel value.
pub const CHANNEL_MAX: f32 = 255.0;

/// Exposure slider units per photographic stop.
pub const EXPOSURE_UNITS_PER_STOP: f32 = 80.0;

/// Start of the highlight rolloff as a fraction of the channel maximum.
pub const KNEE_THRESHOLD: f32 = 0.82;

/// Contrast pivot on the 0..255 scale.
pub const CONTRAST_PIVOT: f32 = 128.0;

/// Red gain per unit of normalized temperature.
pub const TEMPERATURE_RED_GAIN: f32 = 0.10;

/// Blue gain per unit of normalized temperature (applied inversely).
pub const TEMPERATURE_BLUE_GAIN: f32 = 0.20;

/// Green attenuation per unit of normalized tint.
pub const TINT_GREEN_GAIN: f32 = 0.12;

/// Red and blue boost per unit of normalized tint.
pub const TINT_MAGENTA_GAIN: f32 = 0.04;

/// ITU-R BT.709 luminance weights.
pub const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Scales `(max - avg) / CHANNEL_MAX` so a pure primary reaches 1.0.
pub const VIBRANCE_DISTANCE_SCALE: f32 = 1.5;

/// Number of `f32` values in the GPU uniform block.
pub const UNIFORM_LEN: usize = 16;

/// Per-image coefficients for the five stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    /// Multiplier from exposure, `2^(exposure / 80)`.
    pub exposure_gain: f32,
    /// Whether the tanh rolloff is active (only when brightening).
    pub soft_knee: bool,
    /// Contrast scale around [`CONTRAST_PIVOT`].
    pub contrast_factor: f32,
    /// Combined temperature and tint gains for R, G, B.
    pub channel_gain: [f32; 3],
    /// Saturation lerp factor, `1 + saturation / 100`.
    pub saturation_factor: f32,
    /// Vibrance amount in -1..1.
    pub vibrance: f32,
}

impl FilterCoefficients {
    /// Derive coefficients from (clamped) adjustments.
    pub fn from_adjustments(adjustments: &Adjustments) -> Self {
        let adj = adjustments.clamped();

        let exposure_gain = 2.0_f32.powf(adj.exposure / EXPOSURE_UNITS_PER_STOP);
        let c = adj.contrast;
        let contrast_factor = (259.0 * (c + 255.0)) / (255.0 * (259.0 - c));

        let t = adj.temperature / 100.0;
        let k = adj.tint / 100.0;
        let channel_gain = [
            (1.0 + TEMPERATURE_RED_GAIN * t) * (1.0 + TINT_MAGENTA_GAIN * k),
            1.0 - TINT_GREEN_GAIN * k,
            (1.0 - TEMPERATURE_BLUE_GAIN * t) * (1.0 + TINT_MAGENTA_GAIN * k),
        ];

        Self {
            exposure_gain,
            soft_knee: adj.exposure > 0.0,
            contrast_factor,
            channel_gain,
            saturation_factor: 1.0 + adj.saturation / 100.0,
            vibrance: adj.vibrance / 100.0,
        }
    }

    /// Pack into the normalized-space uniform block read by the shader.
    pub fn to_uniform_block(&self) -> [f32; UNIFORM_LEN] {
        [
            self.exposure_gain,
            KNEE_THRESHOLD,
            if self.soft_knee { 1.0 } else { 0.0 },
            self.contrast_factor,
            CONTRAST_PIVOT / CHANNEL_MAX,
            self.channel_gain[0],
            self.channel_gain[1],
            self.channel_gain[2],
            self.saturation_factor,
            self.vibrance,
            VIBRANCE_DISTANCE_SCALE,
            0.0,
            LUMA[0],
            LUMA[1],
            LUMA[2],
            0.0,
        ]
    }
}

/// A reference pixel both filter paths are tested against.
#[derive(Debug, Clone, Copy)]
pub struct GoldenPixel {
    pub name: &'static str,
    pub adjustments: Adjustments,
    pub input: [u8; 3],
    pub expected: [u8; 3],
}

const fn adj(
    exposure: f32,
    contrast: f32,
    temperature: f32,
    tint: f32,
    vibrance: f32,
    saturation: f32,
) -> Adjustments {
    Adjustments {
        exposure,
        contrast,
        temperature,
        tint,
        vibrance,
        saturation,
    }
}

/// Golden fixtures; implementations must match each channel within 1.
pub const GOLDEN_PIXELS: &[GoldenPixel] = &[
    GoldenPixel {
        name: "identity",
        adjustments: adj(0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
        input: [37, 150, 220],
        expected: [37, 150, 220],
    },
    GoldenPixel {
        name: "exposure_one_stop",
        adjustments: adj(80.0, 0.0, 0.0, 0.0, 0.0, 0.0),
        input: [60, 90, 120],
        expected: [120, 180, 236],
    },
    GoldenPixel {
        name: "exposure_max_mid_gray",
        adjustments: adj(100.0, 0.0, 0.0, 0.0, 0.0, 0.0),
        input: [128, 128, 128],
        expected: [254, 254, 254],
    },
    GoldenPixel {
        name: "contrast_plus_40",
        adjustments: adj(0.0, 40.0, 0.0, 0.0, 0.0, 0.0),
        input: [40, 128, 210],
        expected: [8, 128, 240],
    },
    GoldenPixel {
        name: "warm_magenta",
        adjustments: adj(0.0, 0.0, 60.0, 30.0, 0.0, 0.0),
        input: [120, 120, 120],
        expected: [129, 116, 107],
    },
    GoldenPixel {
        name: "desaturate_half",
        adjustments: adj(0.0, 0.0, 0.0, 0.0, 0.0, -50.0),
        input: [200, 100, 50],
        expected: [159, 109, 84],
    },
    GoldenPixel {
        name: "vibrance_muted",
        adjustments: adj(0.0, 0.0, 0.0, 0.0, 80.0, 0.0),
        input: [140, 130, 120],
        expected: [146, 129, 111],
    },
    GoldenPixel {
        name: "combined",
        adjustments: adj(20.0, 15.0, -25.0, 10.0, 30.0, 20.0),
        input: [90, 160, 200],
        expected: [73, 201, 255],
    },
];

/// Compress values above the knee into the remaining headroom.
///
/// `max` is the channel maximum of the space the caller works in (255 for
/// the CPU loop, 1 for the shader).
#[inline]
pub fn soft_knee(value: f32, max: f32) -> f32 {
    let knee = KNEE_THRESHOLD * max;
    if value <= knee {
        return value;
    }
    let headroom = max - knee;
    knee + headroom * ((value - knee) / headroom).tanh()
}

/// BT.709 luminance.
#[inline]
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    LUMA[0] * r + LUMA[1] * g + LUMA[2] * b
}
