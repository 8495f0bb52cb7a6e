//! Logo snapping to the viewport center lines and edges.
//!
//! Positions are viewport-normalized; the pixel threshold is converted with
//! `threshold_px / (viewport_px * display_scale)` per axis.

/// Which lines the logo snapped to during the current drag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapGuides {
    /// Normalized x of the vertical line the logo center snapped to.
    pub vertical: Option<f64>,
    /// Normalized y of the horizontal line the logo center snapped to.
    pub horizontal: Option<f64>,
}

impl SnapGuides {
    pub fn any(&self) -> bool {
        self.vertical.is_some() || self.horizontal.is_some()
    }
}

/// Inputs for one snap computation, all normalized to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapParams {
    /// Half of the logo's bounding box width.
    pub half_w: f64,
    /// Half of the logo's bounding box height.
    pub half_h: f64,
    pub threshold_x: f64,
    pub threshold_y: f64,
}

impl SnapParams {
    /// Build from oriented-pixel extents and a screen-pixel threshold.
    pub fn new(
        half_extent_px: (f64, f64),
        viewport_px: (f64, f64),
        display_scale: f64,
        threshold_px: f64,
    ) -> Self {
        let (vw, vh) = viewport_px;
        Self {
            half_w: half_extent_px.0 / vw,
            half_h: half_extent_px.1 / vh,
            threshold_x: threshold_px / (vw * display_scale),
            threshold_y: threshold_px / (vh * display_scale),
        }
    }
}

/// Snap a logo center; returns the new position and the guides hit.
pub fn snap_position(x: f64, y: f64, params: &SnapParams) -> (f64, f64, SnapGuides) {
    let (x, vertical) = snap_axis(x, params.half_w, params.threshold_x);
    let (y, horizontal) = snap_axis(y, params.half_h, params.threshold_y);
    (
        x,
        y,
        SnapGuides {
            vertical,
            horizontal,
        },
    )
}

/// Nearest of center, near edge and far edge within `threshold`.
fn snap_axis(value: f64, half: f64, threshold: f64) -> (f64, Option<f64>) {
    let targets = [0.5, half, 1.0 - half];
    let nearest = targets
        .into_iter()
        .map(|t| (t, (value - t).abs()))
        .filter(|(_, d)| *d <= threshold)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((target, _)) => (target, Some(target)),
        None => (value, None),
    }
}
