//! Export: full-resolution re-render, resize, encode and naming.

mod compositor;
mod naming;

pub use compositor::{
    compose, draw_overlays, export_photo, ExportError, ExportOptions, ExportedImage, ResizeSpec,
};
pub use naming::NamingScheme;
