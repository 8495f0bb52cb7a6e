//! CPU implementation of the adjustment formula.
//!
//! Applies the six adjustments to RGBA pixel data, leaving alpha untouched.
//! Coefficients come from [`crate::formula`], which the GPU shader reads as
//! well.
//!
//! ## Adjustment Order
//! 1. Exposure
//! 2. Contrast
//! 3. Temperature / Tint
//! 4. Saturation
//! 5. Vibrance
//!
//! Intermediate values are unbounded; clamping to 0..255 happens once, when
//! the pixel is written back.

use crate::formula::{self, FilterCoefficients, CHANNEL_MAX, CONTRAST_PIVOT};
use crate::Adjustments;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Apply all adjustments to RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `adjustments` - The adjustment values to apply (clamped before use)
pub fn apply_all_adjustments(pixels: &mut [u8], adjustments: &Adjustments) {
    let adjustments = adjustments.clamped();
    // Early exit if no adjustments
    if adjustments.is_default() || pixels.len() < BYTES_PER_PIXEL {
        return;
    }

    let coeffs = FilterCoefficients::from_adjustments(&adjustments);

    for chunk in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
        let [r, g, b] = apply_pixel(
            [chunk[0] as f32, chunk[1] as f32, chunk[2] as f32],
            &coeffs,
        );
        chunk[0] = to_channel(r);
        chunk[1] = to_channel(g);
        chunk[2] = to_channel(b);
    }
}

/// Run the five stages on one pixel in 0..255 space, without clamping.
#[inline]
pub fn apply_pixel(rgb: [f32; 3], coeffs: &FilterCoefficients) -> [f32; 3] {
    let [mut r, mut g, mut b] = rgb;

    (r, g, b) = apply_exposure(r, g, b, coeffs);
    (r, g, b) = apply_contrast(r, g, b, coeffs.contrast_factor);
    (r, g, b) = apply_white_balance(r, g, b, coeffs.channel_gain);
    (r, g, b) = apply_saturation(r, g, b, coeffs.saturation_factor);
    (r, g, b) = apply_vibrance(r, g, b, coeffs.vibrance);

    [r, g, b]
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.clamp(0.0, CHANNEL_MAX).round() as u8
}

/// Multiply by the exposure gain, rolling highlights off when brightening.
#[inline]
fn apply_exposure(r: f32, g: f32, b: f32, coeffs: &FilterCoefficients) -> (f32, f32, f32) {
    if coeffs.exposure_gain == 1.0 {
        return (r, g, b);
    }
    let gain = coeffs.exposure_gain;
    if coeffs.soft_knee {
        (
            formula::soft_knee(r * gain, CHANNEL_MAX),
            formula::soft_knee(g * gain, CHANNEL_MAX),
            formula::soft_knee(b * gain, CHANNEL_MAX),
        )
    } else {
        (r * gain, g * gain, b * gain)
    }
}

/// Scale each channel's distance from mid-gray.
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    (
        factor * (r - CONTRAST_PIVOT) + CONTRAST_PIVOT,
        factor * (g - CONTRAST_PIVOT) + CONTRAST_PIVOT,
        factor * (b - CONTRAST_PIVOT) + CONTRAST_PIVOT,
    )
}

/// Temperature and tint as independent per-channel multipliers.
#[inline]
fn apply_white_balance(r: f32, g: f32, b: f32, gain: [f32; 3]) -> (f32, f32, f32) {
    (r * gain[0], g * gain[1], b * gain[2])
}

/// Interpolate between the pixel and its luminance.
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    let gray = formula::luminance(r, g, b);
    (
        gray + (r - gray) * factor,
        gray + (g - gray) * factor,
        gray + (b - gray) * factor,
    )
}

/// Saturation boost that fades out as the pixel gets more colorful.
///
/// Distance from the channel average stands in for existing saturation, so a
/// pure primary is left alone while muted tones get the full amount.
/// Luminance is preserved because the lerp pivots on it.
#[inline]
fn apply_vibrance(r: f32, g: f32, b: f32, vibrance: f32) -> (f32, f32, f32) {
    if vibrance == 0.0 {
        return (r, g, b);
    }
    let avg = (r + g + b) / 3.0;
    let max_c = r.max(g).max(b);
    let distance =
        ((max_c - avg) / CHANNEL_MAX * formula::VIBRANCE_DISTANCE_SCALE).clamp(0.0, 1.0);
    let amount = vibrance * (1.0 - distance);
    apply_saturation(r, g, b, 1.0 + amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::GOLDEN_PIXELS;

    /// Helper to create an opaque pixel from RGB values (0-255)
    fn pixel(r: u8, g: u8, b: u8) -> Vec<u8> {
        vec![r, g, b, 255]
    }

    /// Helper to apply adjustments and return resulting pixel
    fn apply(pixels: &[u8], adj: &Adjustments) -> Vec<u8> {
        let mut result = pixels.to_vec();
        apply_all_adjustments(&mut result, adj);
        result
    }

    // ===== Identity Tests =====

    #[test]
    fn test_identity_no_adjustments() {
        let pixels = pixel(128, 64, 192);
        let result = apply(&pixels, &Adjustments::default());
        assert_eq!(result, pixels, "Default adjustments should not change pixels");
    }

    #[test]
    fn test_identity_extremes() {
        let pixels = [pixel(0, 0, 0), pixel(255, 255, 255), pixel(250, 3, 240)].concat();
        let result = apply(&pixels, &Adjustments::default());
        assert_eq!(result, pixels);
    }

    #[test]
    fn test_identity_after_clamping_non_finite() {
        let pixels = pixel(10, 200, 90);
        let adj = Adjustments {
            exposure: f32::NAN,
            ..Default::default()
        };
        assert_eq!(apply(&pixels, &adj), pixels);
    }

    #[test]
    fn test_alpha_untouched() {
        let pixels = vec![100, 100, 100, 17];
        let adj = Adjustments {
            exposure: 60.0,
            saturation: -40.0,
            ..Default::default()
        };
        let result = apply(&pixels, &adj);
        assert_eq!(result[3], 17);
    }

    // ===== Golden Pixels =====

    #[test]
    fn test_golden_pixels() {
        for golden in GOLDEN_PIXELS {
            let [r, g, b] = golden.input;
            let result = apply(&pixel(r, g, b), &golden.adjustments);
            for c in 0..3 {
                let diff = (result[c] as i32 - golden.expected[c] as i32).abs();
                assert!(
                    diff <= 1,
                    "{}: channel {} got {} expected {}",
                    golden.name,
                    c,
                    result[c],
                    golden.expected[c]
                );
            }
        }
    }

    // ===== Exposure Tests =====

    #[test]
    fn test_exposure_one_stop() {
        let adj = Adjustments {
            exposure: 80.0,
            ..Default::default()
        };
        let result = apply(&pixel(50, 50, 50), &adj);
        assert_eq!(result, pixel(100, 100, 100));
    }

    #[test]
    fn test_exposure_max_on_mid_gray_stays_below_white() {
        let adj = Adjustments {
            exposure: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(128, 128, 128), &adj);
        assert!(result[0] < 255, "soft knee should keep mid-gray below 255");
        assert!(result[0] > 209, "value should land in the rolloff region");
    }

    #[test]
    fn test_exposure_negative_darkens() {
        let adj = Adjustments {
            exposure: -80.0,
            ..Default::default()
        };
        let result = apply(&pixel(250, 250, 250), &adj);
        assert_eq!(result, pixel(125, 125, 125));
    }

    // ===== Contrast Tests =====

    #[test]
    fn test_contrast_positive() {
        let adj = Adjustments {
            contrast: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(64, 128, 192), &adj);
        assert!(result[0] < 64, "Dark pixel should get darker");
        assert_eq!(result[1], 128, "Pivot should stay fixed");
        assert!(result[2] > 192, "Bright pixel should get brighter");
    }

    #[test]
    fn test_contrast_negative() {
        let adj = Adjustments {
            contrast: -50.0,
            ..Default::default()
        };
        let result = apply(&pixel(0, 128, 255), &adj);
        assert!(result[0] > 0, "Black should move toward gray");
        assert_eq!(result[1], 128);
        assert!(result[2] < 255, "White should move toward gray");
    }

    // ===== Temperature / Tint Tests =====

    #[test]
    fn test_temperature_warm() {
        let adj = Adjustments {
            temperature: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(128, 128, 128), &adj);
        assert!(result[0] > 128, "Red should increase for warm");
        assert_eq!(result[1], 128);
        assert!(result[2] < 128, "Blue should decrease for warm");
    }

    #[test]
    fn test_temperature_cool() {
        let adj = Adjustments {
            temperature: -100.0,
            ..Default::default()
        };
        let result = apply(&pixel(128, 128, 128), &adj);
        assert!(result[0] < 128, "Red should decrease for cool");
        assert!(result[2] > 128, "Blue should increase for cool");
    }

    #[test]
    fn test_tint_magenta_and_green() {
        let magenta = Adjustments {
            tint: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(128, 128, 128), &magenta);
        assert!(result[0] > 128);
        assert!(result[1] < 128);
        assert!(result[2] > 128);

        let green = Adjustments {
            tint: -100.0,
            ..Default::default()
        };
        let result = apply(&pixel(128, 128, 128), &green);
        assert!(result[1] > 128);
        assert!(result[0] < 128);
    }

    // ===== Saturation Tests =====

    #[test]
    fn test_saturation_desaturate() {
        let adj = Adjustments {
            saturation: -100.0,
            ..Default::default()
        };
        let result = apply(&pixel(200, 128, 100), &adj);
        assert_eq!(result[0], result[1]);
        assert_eq!(result[1], result[2]);
    }

    #[test]
    fn test_saturation_increase() {
        let adj = Adjustments {
            saturation: 50.0,
            ..Default::default()
        };
        let result = apply(&pixel(200, 128, 100), &adj);
        let new_diff = result[0] as i32 - result[2] as i32;
        assert!(new_diff > 100, "Color difference should increase");
    }

    // ===== Vibrance Tests =====

    #[test]
    fn test_vibrance_protects_saturated() {
        let adj = Adjustments {
            vibrance: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(255, 0, 0), &adj);
        assert_eq!(result, pixel(255, 0, 0));
    }

    #[test]
    fn test_vibrance_boosts_muted() {
        let adj = Adjustments {
            vibrance: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(140, 130, 120), &adj);
        let new_diff = result[0] as i32 - result[2] as i32;
        assert!(new_diff > 20 * 3 / 2, "muted color should gain separation");
    }

    #[test]
    fn test_vibrance_preserves_luminance() {
        let adj = Adjustments {
            vibrance: 60.0,
            ..Default::default()
        };
        let input = [150.0, 120.0, 100.0];
        let coeffs = FilterCoefficients::from_adjustments(&adj);
        let out = apply_pixel(input, &coeffs);
        let before = formula::luminance(input[0], input[1], input[2]);
        let after = formula::luminance(out[0], out[1], out[2]);
        assert!((before - after).abs() < 1e-3);
    }

    // ===== Purity / Edge Cases =====

    #[test]
    fn test_same_result_twice() {
        let pixels = [pixel(12, 140, 220), pixel(90, 90, 30)].concat();
        let adj = Adjustments {
            exposure: 25.0,
            contrast: 30.0,
            temperature: -20.0,
            tint: 10.0,
            vibrance: 40.0,
            saturation: -15.0,
        };
        assert_eq!(apply(&pixels, &adj), apply(&pixels, &adj));
    }

    #[test]
    fn test_out_of_range_matches_clamped() {
        let pixels = pixel(70, 80, 90);
        let wild = Adjustments {
            contrast: 500.0,
            ..Default::default()
        };
        let max = Adjustments {
            contrast: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixels, &wild), apply(&pixels, &max));
    }

    #[test]
    fn test_empty_pixels() {
        let mut pixels: Vec<u8> = vec![];
        let adj = Adjustments {
            exposure: 10.0,
            ..Default::default()
        };
        apply_all_adjustments(&mut pixels, &adj);
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_incomplete_pixel_ignored() {
        // 6 bytes = 1 complete pixel + 2 byte remainder
        let mut pixels = vec![100, 100, 100, 255, 64, 64];
        let adj = Adjustments {
            exposure: 80.0,
            ..Default::default()
        };
        apply_all_adjustments(&mut pixels, &adj);
        assert_eq!(pixels[0], 200);
        assert_eq!(&pixels[4..], &[64, 64]);
    }
}
