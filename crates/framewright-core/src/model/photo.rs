//! Per-photo edit recipe.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::ImageHandle;
use crate::Adjustments;

/// Straighten is limited to this many degrees either way.
pub const STRAIGHTEN_LIMIT_DEGREES: f64 = 45.0;

static NEXT_PHOTO_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_LOGO_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a photo across every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(u64);

impl PhotoId {
    pub fn next() -> Self {
        Self(NEXT_PHOTO_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for PhotoId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Identity of a logo layer within its photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogoId(u64);

impl LogoId {
    pub fn next() -> Self {
        Self(NEXT_LOGO_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for LogoId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Coarse rotation in quarter turns, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parse a multiple of 90 degrees (negative values wrap).
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self::from_quarter_turns(degrees / 90))
    }

    fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub fn quarter_turns(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() * 90
    }

    pub fn clockwise(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + 1)
    }

    pub fn counter_clockwise(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() - 1)
    }

    /// True for 90 and 270, where width and height trade places.
    pub fn swaps_axes(self) -> bool {
        self.quarter_turns() % 2 == 1
    }
}

/// Crop rectangle in oriented (post-rotation) pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.right(), self.bottom())
    }
}

/// A draggable overlay image, positioned relative to the crop viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoLayer {
    pub id: LogoId,
    pub image: ImageHandle,
    /// Center x in 0..1 of the viewport width.
    pub x: f64,
    /// Center y in 0..1 of the viewport height.
    pub y: f64,
    /// Logo width as a fraction of the viewport's shorter side.
    pub scale: f64,
    /// Radians, clockwise on screen.
    pub rotation: f64,
}

impl LogoLayer {
    /// A centered, unrotated logo.
    pub fn new(image: ImageHandle, scale: f64) -> Self {
        Self {
            id: LogoId::next(),
            image,
            x: 0.5,
            y: 0.5,
            scale,
            rotation: 0.0,
        }
    }

    /// Height over width of the logo image.
    pub fn aspect(&self) -> f64 {
        let w = self.image.width().max(1) as f64;
        self.image.height() as f64 / w
    }
}

/// A photo and the recipe that describes how to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: PhotoId,
    pub name: String,
    pub source: ImageHandle,
    pub thumbnail: ImageHandle,
    pub natural_width: u32,
    pub natural_height: u32,
    pub rotation: Rotation,
    /// Fine rotation in degrees, -45..45.
    pub straighten: f64,
    pub adjustments: Adjustments,
    pub crop: Option<CropRect>,
    pub frame: Option<ImageHandle>,
    /// Paint order; the last logo is on top.
    pub logos: Vec<LogoLayer>,
}

impl Photo {
    /// A photo with an empty recipe. Natural size comes from `source`.
    pub fn new(name: impl Into<String>, source: ImageHandle, thumbnail: ImageHandle) -> Self {
        Self {
            id: PhotoId::next(),
            name: name.into(),
            natural_width: source.width(),
            natural_height: source.height(),
            source,
            thumbnail,
            rotation: Rotation::Deg0,
            straighten: 0.0,
            adjustments: Adjustments::default(),
            crop: None,
            frame: None,
            logos: Vec::new(),
        }
    }

    /// Changing the rotation discards the crop, which lives in oriented space.
    pub fn with_rotation(&self, rotation: Rotation) -> Self {
        let mut next = self.clone();
        if rotation != self.rotation {
            next.rotation = rotation;
            next.crop = None;
        }
        next
    }

    pub fn with_straighten(&self, degrees: f64) -> Self {
        let degrees = if degrees.is_finite() {
            degrees.clamp(-STRAIGHTEN_LIMIT_DEGREES, STRAIGHTEN_LIMIT_DEGREES)
        } else {
            0.0
        };
        Self {
            straighten: degrees,
            ..self.clone()
        }
    }

    pub fn with_adjustments(&self, adjustments: Adjustments) -> Self {
        Self {
            adjustments: adjustments.clamped(),
            ..self.clone()
        }
    }

    pub fn with_crop(&self, crop: Option<CropRect>) -> Self {
        Self {
            crop,
            ..self.clone()
        }
    }

    pub fn with_frame(&self, frame: Option<ImageHandle>) -> Self {
        Self {
            frame,
            ..self.clone()
        }
    }

    pub fn with_logos(&self, logos: Vec<LogoLayer>) -> Self {
        Self {
            logos,
            ..self.clone()
        }
    }

    pub fn logo(&self, id: LogoId) -> Option<&LogoLayer> {
        self.logos.iter().find(|l| l.id == id)
    }

    /// Replace one logo, keeping its position in the paint order.
    pub fn with_logo(&self, logo: LogoLayer) -> Option<Self> {
        let idx = self.logos.iter().position(|l| l.id == logo.id)?;
        let mut logos = self.logos.clone();
        logos[idx] = logo;
        Some(self.with_logos(logos))
    }
}
