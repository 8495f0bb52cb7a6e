//! Coordinate spaces as distinct types.
//!
//! A [`Point`] carries its space as a type parameter, so passing a screen
//! position where an oriented one is expected does not compile. Conversions
//! are explicit calls that take whatever context they need (rotation,
//! viewport, display mapping).
//!
//! | Space | Units | Origin |
//! |---|---|---|
//! | [`ImageSpace`] | stored source pixels | top-left of the decoded image |
//! | [`OrientedSpace`] | pixels after the 90° rotation | top-left of the rotated image |
//! | [`ViewportSpace`] | 0..1 of the crop viewport | top-left of the viewport |
//! | [`ScreenSpace`] | display pixels | host-defined |

use std::marker::PhantomData;

use crate::model::CropRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSpace {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientedSpace {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSpace {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSpace {}

/// A point tagged with the space it lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    space: PhantomData<S>,
}

pub type ImagePoint = Point<ImageSpace>;
pub type OrientedPoint = Point<OrientedSpace>;
pub type ViewportPoint = Point<ViewportSpace>;
pub type ScreenPoint = Point<ScreenSpace>;

impl<S> Point<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    /// Drop the tag for use with kurbo math.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }

    pub fn from_kurbo(p: kurbo::Point) -> Self {
        Self::new(p.x, p.y)
    }

    pub fn distance(self, other: Self) -> f64 {
        self.to_kurbo().distance(other.to_kurbo())
    }
}

impl OrientedPoint {
    /// Normalize against a viewport rectangle.
    pub fn to_viewport(self, viewport: &CropRect) -> ViewportPoint {
        Point::new(
            (self.x - viewport.x) / viewport.width,
            (self.y - viewport.y) / viewport.height,
        )
    }
}

impl ViewportPoint {
    pub fn to_oriented(self, viewport: &CropRect) -> OrientedPoint {
        Point::new(
            viewport.x + self.x * viewport.width,
            viewport.y + self.y * viewport.height,
        )
    }
}

/// How a rectangle of oriented space is laid out on screen.
///
/// In crop mode `shown` is the full oriented image; in logo mode it is the
/// crop viewport. `scale` is screen pixels per oriented pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    pub shown: CropRect,
    pub origin: ScreenPoint,
    pub scale: f64,
}

impl DisplayMapping {
    pub fn new(shown: CropRect, origin: ScreenPoint, scale: f64) -> Self {
        Self {
            shown,
            origin,
            scale: if scale.is_finite() && scale > 0.0 {
                scale
            } else {
                1.0
            },
        }
    }

    pub fn to_oriented(&self, p: ScreenPoint) -> OrientedPoint {
        Point::new(
            self.shown.x + (p.x - self.origin.x) / self.scale,
            self.shown.y + (p.y - self.origin.y) / self.scale,
        )
    }

    pub fn to_screen(&self, p: OrientedPoint) -> ScreenPoint {
        Point::new(
            self.origin.x + (p.x - self.shown.x) * self.scale,
            self.origin.y + (p.y - self.shown.y) * self.scale,
        )
    }

    /// Convert a screen length (e.g. a hit radius) to oriented pixels.
    pub fn screen_len(&self, px: f64) -> f64 {
        px / self.scale
    }
}
