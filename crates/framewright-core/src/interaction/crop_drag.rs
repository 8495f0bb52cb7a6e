//! Crop rectangle dragging.
//!
//! Resizing keeps the edges opposite the handle fixed and applies, in
//! order: clamp to bounds, fix the locked ratio, enforce the minimum size.

use super::hit_test::CropHandle;
use crate::model::CropRect;
use crate::transform::clamp_crop;

/// Translate the crop by `(dx, dy)`, keeping it inside the bounds.
pub fn move_crop(start: CropRect, dx: f64, dy: f64, bounds: (f64, f64)) -> CropRect {
    clamp_crop(
        CropRect::new(start.x + dx, start.y + dy, start.width, start.height),
        bounds.0,
        bounds.1,
    )
}

/// Resize from `start` by dragging `handle` by `(dx, dy)` oriented pixels.
///
/// `min_size` is in oriented pixels (screen minimum / display scale).
pub fn resize_crop(
    start: CropRect,
    handle: CropHandle,
    dx: f64,
    dy: f64,
    bounds: (f64, f64),
    ratio: Option<f64>,
    min_size: f64,
) -> CropRect {
    let (bw, bh) = bounds;
    let mut left = start.x;
    let mut right = start.right();
    let mut top = start.y;
    let mut bottom = start.bottom();

    // 1. move, then clamp the moving edges to the bounds
    if handle.moves_left() {
        left = (left + dx).clamp(0.0, bw);
    }
    if handle.moves_right() {
        right = (right + dx).clamp(0.0, bw);
    }
    if handle.moves_top() {
        top = (top + dy).clamp(0.0, bh);
    }
    if handle.moves_bottom() {
        bottom = (bottom + dy).clamp(0.0, bh);
    }

    let mut width = right - left;
    let mut height = bottom - top;
    // side handles under a ratio grow the other axis around the start center
    let mut center_x = None;
    let mut center_y = None;

    // 2. locked ratio
    let ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
    if let Some(r) = ratio {
        let horizontal = handle.moves_left() || handle.moves_right();
        let vertical = handle.moves_top() || handle.moves_bottom();
        if horizontal && vertical {
            // shrink whichever side overshoots the ratio
            if width.abs() / height.abs().max(f64::MIN_POSITIVE) > r {
                width = height.abs() * r * width.signum();
            } else {
                height = width.abs() / r * height.signum();
            }
        } else if horizontal {
            let (_, cy) = start.center();
            let room = 2.0 * cy.min(bh - cy);
            height = (width.abs() / r).min(room);
            width = height * r * width.signum();
            center_y = Some(cy);
        } else {
            let (cx, _) = start.center();
            let room = 2.0 * cx.min(bw - cx);
            width = (height.abs() * r).min(room);
            height = width / r * height.signum();
            center_x = Some(cx);
        }
    }

    // 3. minimum size
    let min_w = match ratio {
        Some(r) => min_size.max(min_size * r),
        None => min_size,
    };
    let min_h = match ratio {
        Some(r) => min_w / r,
        None => min_size,
    };
    width = width.max(min_w);
    height = height.max(min_h);

    let x = match center_x {
        Some(cx) => cx - width / 2.0,
        None if handle.moves_left() => start.right() - width,
        None => left,
    };
    let y = match center_y {
        Some(cy) => cy - height / 2.0,
        None if handle.moves_top() => start.bottom() - height,
        None => top,
    };

    clamp_crop(CropRect::new(x, y, width, height), bw, bh)
}
