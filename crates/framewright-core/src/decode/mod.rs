//! Image decoding boundary for Framewright.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG and WebP files into RGBA with EXIF orientation applied
//! - Downscaling decoded images for thumbnails and export resizing
//!
//! Format conversion of camera formats (HEIC and friends) happens in the host
//! before bytes reach this module.

mod raster;
mod resize;
mod types;

pub use raster::{decode_image, decode_image_no_orientation, get_orientation};
pub use resize::{generate_thumbnail, resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
