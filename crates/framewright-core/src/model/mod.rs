//! The edit model: photos, their edit recipes and the collection they live in.
//!
//! Nothing in here is mutated in place. Every change produces a new [`Photo`]
//! and a new [`Collection`] that shares all untouched photos with the previous
//! one, which is what makes whole-collection snapshots cheap enough for undo.

mod collection;
mod handle;
mod photo;

pub use collection::Collection;
pub use handle::{HandleId, ImageHandle};
pub use photo::{
    CropRect, LogoId, LogoLayer, Photo, PhotoId, Rotation, STRAIGHTEN_LIMIT_DEGREES,
};
