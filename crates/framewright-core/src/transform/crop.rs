//! Crop clamping and fixed aspect ratios.
//!
//! Crops live in oriented pixel space and must lie inside the oriented
//! bounds. Nothing here returns an error: out-of-range input is clamped.

use crate::model::CropRect;

/// Relative tolerance when deciding a crop already has a ratio.
const RATIO_EPSILON: f64 = 1e-6;

/// Clamp a crop so it fits inside `bounds_w x bounds_h`.
///
/// The size is limited first, then the position is pulled back inside.
/// Degenerate bounds (zero, negative or NaN) collapse the crop to a zero
/// extent on that axis.
pub fn clamp_crop(rect: CropRect, bounds_w: f64, bounds_h: f64) -> CropRect {
    let bounds_w = bounds_w.max(0.0);
    let bounds_h = bounds_h.max(0.0);
    let width = finite_or(rect.width, bounds_w).clamp(f64::MIN_POSITIVE.min(bounds_w), bounds_w);
    let height = finite_or(rect.height, bounds_h).clamp(f64::MIN_POSITIVE.min(bounds_h), bounds_h);
    let x = finite_or(rect.x, 0.0).clamp(0.0, bounds_w - width);
    let y = finite_or(rect.y, 0.0).clamp(0.0, bounds_h - height);
    CropRect::new(x, y, width, height)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Reshape a crop to `ratio` (width / height).
///
/// Keeps the crop center and roughly its area, shrinks to fit the bounds,
/// then re-centers and clamps. A crop that already has the ratio is only
/// clamped, so applying the same ratio twice changes nothing.
pub fn apply_aspect_ratio(
    crop: Option<CropRect>,
    ratio: f64,
    bounds_w: f64,
    bounds_h: f64,
) -> CropRect {
    let base = crop.unwrap_or(CropRect::new(0.0, 0.0, bounds_w, bounds_h));

    if !(ratio.is_finite() && ratio > 0.0) {
        return clamp_crop(base, bounds_w, bounds_h);
    }

    if ((base.aspect() - ratio) / ratio).abs() < RATIO_EPSILON {
        return clamp_crop(base, bounds_w, bounds_h);
    }

    let area = base.area();
    let mut width = (area * ratio).sqrt();
    let mut height = width / ratio;

    if width > bounds_w {
        width = bounds_w;
        height = width / ratio;
    }
    if height > bounds_h {
        height = bounds_h;
        width = height * ratio;
    }

    let (cx, cy) = base.center();
    clamp_crop(
        CropRect::centered(cx, cy, width, height),
        bounds_w,
        bounds_h,
    )
}

/// Named crop ratios offered in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectPreset {
    Free,
    Square,
    Landscape4x3,
    Portrait3x4,
    Landscape3x2,
    Portrait2x3,
    Wide16x9,
    Tall9x16,
    Portrait4x5,
    Landscape5x4,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 10] = [
        AspectPreset::Free,
        AspectPreset::Square,
        AspectPreset::Landscape4x3,
        AspectPreset::Portrait3x4,
        AspectPreset::Landscape3x2,
        AspectPreset::Portrait2x3,
        AspectPreset::Wide16x9,
        AspectPreset::Tall9x16,
        AspectPreset::Portrait4x5,
        AspectPreset::Landscape5x4,
    ];

    /// Width over height, or `None` for a free crop.
    pub fn ratio(self) -> Option<f64> {
        let (w, h) = match self {
            AspectPreset::Free => return None,
            AspectPreset::Square => (1.0, 1.0),
            AspectPreset::Landscape4x3 => (4.0, 3.0),
            AspectPreset::Portrait3x4 => (3.0, 4.0),
            AspectPreset::Landscape3x2 => (3.0, 2.0),
            AspectPreset::Portrait2x3 => (2.0, 3.0),
            AspectPreset::Wide16x9 => (16.0, 9.0),
            AspectPreset::Tall9x16 => (9.0, 16.0),
            AspectPreset::Portrait4x5 => (4.0, 5.0),
            AspectPreset::Landscape5x4 => (5.0, 4.0),
        };
        Some(w / h)
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectPreset::Free => "free",
            AspectPreset::Square => "1:1",
            AspectPreset::Landscape4x3 => "4:3",
            AspectPreset::Portrait3x4 => "3:4",
            AspectPreset::Landscape3x2 => "3:2",
            AspectPreset::Portrait2x3 => "2:3",
            AspectPreset::Wide16x9 => "16:9",
            AspectPreset::Tall9x16 => "9:16",
            AspectPreset::Portrait4x5 => "4:5",
            AspectPreset::Landscape5x4 => "5:4",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_from_full_portrait_rect() {
        let crop = apply_aspect_ratio(None, 1.0, 3000.0, 4000.0);
        assert_eq!(crop, CropRect::new(0.0, 500.0, 3000.0, 3000.0));
    }

    #[test]
    fn test_ratio_keeps_center_and_area() {
        let base = CropRect::new(100.0, 100.0, 400.0, 100.0);
        let crop = apply_aspect_ratio(Some(base), 1.0, 1000.0, 1000.0);
        assert!((crop.width - 200.0).abs() < 1e-9);
        assert!((crop.height - 200.0).abs() < 1e-9);
        let (cx, cy) = crop.center();
        assert!((cx - 300.0).abs() < 1e-9 && (cy - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_recenters_inside_bounds() {
        // near the corner: the new square pokes out and gets pulled back
        let base = CropRect::new(0.0, 0.0, 100.0, 10.0);
        let crop = apply_aspect_ratio(Some(base), 1.0, 200.0, 200.0);
        assert!(crop.x >= 0.0 && crop.y >= 0.0);
        assert!(crop.right() <= 200.0 && crop.bottom() <= 200.0);
        assert!((crop.aspect() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_ratio_is_fixed_point() {
        let once = apply_aspect_ratio(None, 16.0 / 9.0, 4000.0, 3000.0);
        let twice = apply_aspect_ratio(Some(once), 16.0 / 9.0, 4000.0, 3000.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_ratio_only_clamps() {
        let base = CropRect::new(-10.0, 0.0, 50.0, 50.0);
        let crop = apply_aspect_ratio(Some(base), f64::NAN, 100.0, 100.0);
        assert_eq!(crop, CropRect::new(0.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn test_clamp_crop_limits_size_then_position() {
        let crop = clamp_crop(CropRect::new(80.0, -5.0, 300.0, 20.0), 100.0, 50.0);
        assert_eq!(crop, CropRect::new(0.0, 0.0, 100.0, 20.0));
    }

    #[test]
    fn test_zero_bounds_collapse_instead_of_panicking() {
        let crop = clamp_crop(CropRect::new(5.0, 5.0, 10.0, 10.0), 0.0, 0.0);
        assert_eq!(crop, CropRect::new(0.0, 0.0, 0.0, 0.0));

        let square = apply_aspect_ratio(None, 1.0, 0.0, 0.0);
        assert_eq!(square, CropRect::new(0.0, 0.0, 0.0, 0.0));

        let thin = apply_aspect_ratio(None, 16.0 / 9.0, 0.0, 40.0);
        assert_eq!(thin.width, 0.0);
        assert!(thin.bottom() <= 40.0);

        let nan = clamp_crop(CropRect::new(1.0, 1.0, 1.0, 1.0), f64::NAN, -3.0);
        assert_eq!(nan, CropRect::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_presets() {
        assert_eq!(AspectPreset::Free.ratio(), None);
        assert_eq!(AspectPreset::Square.ratio(), Some(1.0));
        assert_eq!(AspectPreset::from_label("16:9"), Some(AspectPreset::Wide16x9));
        assert_eq!(AspectPreset::from_label("7:3"), None);
        for preset in AspectPreset::ALL {
            assert_eq!(AspectPreset::from_label(preset.label()), Some(preset));
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn ratio() -> impl Strategy<Value = f64> {
        prop_oneof![
            Just(1.0),
            Just(4.0 / 3.0),
            Just(3.0 / 2.0),
            Just(16.0 / 9.0),
            Just(4.0 / 5.0),
            0.2f64..5.0,
        ]
    }

    proptest! {
        #[test]
        fn prop_apply_ratio_is_idempotent(
            bw in 10.0f64..5000.0,
            bh in 10.0f64..5000.0,
            fx in 0.0f64..1.0,
            fy in 0.0f64..1.0,
            fw in 0.05f64..1.0,
            fh in 0.05f64..1.0,
            r in ratio(),
        ) {
            let w = fw * bw;
            let h = fh * bh;
            let base = CropRect::new(fx * (bw - w), fy * (bh - h), w, h);
            let once = apply_aspect_ratio(Some(base), r, bw, bh);
            let twice = apply_aspect_ratio(Some(once), r, bw, bh);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_apply_ratio_stays_in_bounds(
            bw in 10.0f64..5000.0,
            bh in 10.0f64..5000.0,
            r in ratio(),
        ) {
            let crop = apply_aspect_ratio(None, r, bw, bh);
            prop_assert!(crop.x >= 0.0 && crop.y >= 0.0);
            prop_assert!(crop.right() <= bw + 1e-9);
            prop_assert!(crop.bottom() <= bh + 1e-9);
            prop_assert!(((crop.aspect() - r) / r).abs() < 1e-6);
        }

        #[test]
        fn prop_clamp_never_leaves_bounds(
            bw in prop_oneof![Just(0.0f64), 0.0f64..50.0, 50.0f64..5000.0],
            bh in prop_oneof![Just(0.0f64), 0.0f64..50.0, 50.0f64..5000.0],
            x in -100.0f64..6000.0,
            y in -100.0f64..6000.0,
            w in -10.0f64..6000.0,
            h in -10.0f64..6000.0,
        ) {
            let crop = clamp_crop(CropRect::new(x, y, w, h), bw, bh);
            prop_assert!(crop.x >= 0.0 && crop.y >= 0.0);
            prop_assert!(crop.width >= 0.0 && crop.height >= 0.0);
            prop_assert!(crop.right() <= bw + 1e-9);
            prop_assert!(crop.bottom() <= bh + 1e-9);
        }
    }
}
