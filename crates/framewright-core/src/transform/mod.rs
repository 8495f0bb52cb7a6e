//! Geometric transform resolver.
//!
//! Maps between stored image pixels, oriented pixels, the crop viewport and
//! output pixels. Preview, thumbnails and export all resolve geometry here,
//! and differ only in output scale and in whether overlays are drawn.
//!
//! # Coordinate System
//!
//! - Quarter-turn rotation and straighten are clockwise on screen
//! - Crop rectangles are in oriented pixels
//! - Logo positions are normalized (0.0 to 1.0) to the crop viewport
//! - Origin is the top-left corner

mod crop;
mod render;
mod resolver;
pub mod space;

pub use crop::{apply_aspect_ratio, clamp_crop, AspectPreset};
pub use render::{render_geometry, warp};
pub(crate) use render::sample;
pub use resolver::{
    active_viewport, effective_dimensions, fit_scale, full_rect, image_to_oriented,
    oriented_to_image, quarter_turn, render_transform, RenderTransform,
};
pub use space::{
    DisplayMapping, ImagePoint, OrientedPoint, Point, ScreenPoint, ViewportPoint,
};
