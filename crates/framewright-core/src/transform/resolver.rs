//! Geometry of a photo: effective size, active viewport and the render
//! transform shared by preview, thumbnails and export.
//!
//! # Transform Order
//!
//! The render transform maps stored pixel coordinates to output pixels:
//!
//! ```text
//! T6 · S5 · R4 · T3 · R2 · T1 · S0
//! ```
//!
//! 0. scale stored pixels to natural size (thumbnails are smaller)
//! 1. translate the image center to the origin
//! 2. rotate by the quarter-turn rotation
//! 3. translate the viewport center to the origin
//! 4. rotate by straighten (pivot = viewport center)
//! 5. scale by the output scale `s`
//! 6. translate to the destination center
//!
//! Positive angles turn clockwise on screen (y grows downward).

use kurbo::{Affine, Vec2};

use super::space::{ImagePoint, OrientedPoint, Point};
use crate::model::{CropRect, Photo, Rotation};

/// Width and height after the quarter-turn rotation.
pub fn effective_dimensions(photo: &Photo) -> (u32, u32) {
    if photo.rotation.swaps_axes() {
        (photo.natural_height, photo.natural_width)
    } else {
        (photo.natural_width, photo.natural_height)
    }
}

/// The whole oriented image as a rectangle.
pub fn full_rect(photo: &Photo) -> CropRect {
    let (w, h) = effective_dimensions(photo);
    CropRect::new(0.0, 0.0, w as f64, h as f64)
}

/// The crop if there is one, otherwise the full oriented rectangle.
pub fn active_viewport(photo: &Photo) -> CropRect {
    photo.crop.unwrap_or_else(|| full_rect(photo))
}

/// Exact matrix for a quarter-turn rotation about the origin.
pub fn quarter_turn(rotation: Rotation) -> Affine {
    match rotation {
        Rotation::Deg0 => Affine::IDENTITY,
        Rotation::Deg90 => Affine::new([0.0, 1.0, -1.0, 0.0, 0.0, 0.0]),
        Rotation::Deg180 => Affine::new([-1.0, 0.0, 0.0, -1.0, 0.0, 0.0]),
        Rotation::Deg270 => Affine::new([0.0, -1.0, 1.0, 0.0, 0.0, 0.0]),
    }
}

/// Map from natural image pixels to oriented pixels.
fn orientation_affine(photo: &Photo) -> Affine {
    let (ew, eh) = effective_dimensions(photo);
    let natural_center = Vec2::new(
        photo.natural_width as f64 / 2.0,
        photo.natural_height as f64 / 2.0,
    );
    let oriented_center = Vec2::new(ew as f64 / 2.0, eh as f64 / 2.0);
    Affine::translate(oriented_center)
        * quarter_turn(photo.rotation)
        * Affine::translate(-natural_center)
}

/// Natural image coordinates to oriented coordinates.
pub fn image_to_oriented(photo: &Photo, p: ImagePoint) -> OrientedPoint {
    Point::from_kurbo(orientation_affine(photo) * p.to_kurbo())
}

/// Oriented coordinates back to natural image coordinates.
pub fn oriented_to_image(photo: &Photo, p: OrientedPoint) -> ImagePoint {
    Point::from_kurbo(orientation_affine(photo).inverse() * p.to_kurbo())
}

/// A resolved transform plus the output canvas it targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    /// Stored source pixels to output pixels.
    pub affine: Affine,
    pub width: u32,
    pub height: u32,
}

impl RenderTransform {
    /// Output pixels back to stored source pixels, for inverse sampling.
    pub fn inverse(&self) -> Affine {
        self.affine.inverse()
    }
}

/// Resolve the render transform for a photo.
///
/// `stored` is the size of the buffer actually being sampled (the source or
/// the thumbnail). The output canvas is the viewport scaled by `scale`.
pub fn render_transform(photo: &Photo, stored: (u32, u32), scale: f64) -> RenderTransform {
    let viewport = active_viewport(photo);
    let (ew, eh) = effective_dimensions(photo);

    let width = ((viewport.width * scale).round() as u32).max(1);
    let height = ((viewport.height * scale).round() as u32).max(1);

    let to_natural = Affine::scale_non_uniform(
        photo.natural_width as f64 / stored.0.max(1) as f64,
        photo.natural_height as f64 / stored.1.max(1) as f64,
    );
    let t1 = Affine::translate(Vec2::new(
        -(photo.natural_width as f64) / 2.0,
        -(photo.natural_height as f64) / 2.0,
    ));
    let r2 = quarter_turn(photo.rotation);
    let (vcx, vcy) = viewport.center();
    let t3 = Affine::translate(Vec2::new(-(vcx - ew as f64 / 2.0), -(vcy - eh as f64 / 2.0)));
    let r4 = Affine::rotate(photo.straighten.to_radians());
    let s5 = Affine::scale(scale);
    let t6 = Affine::translate(Vec2::new(width as f64 / 2.0, height as f64 / 2.0));

    RenderTransform {
        affine: t6 * s5 * r4 * t3 * r2 * t1 * to_natural,
        width,
        height,
    }
}

/// Largest scale at which the viewport fits inside `max_w x max_h`, never
/// above 1.
pub fn fit_scale(viewport: &CropRect, max_w: u32, max_h: u32) -> f64 {
    let sx = max_w as f64 / viewport.width;
    let sy = max_h as f64 / viewport.height;
    sx.min(sy).min(1.0)
}
