//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding RGBA images to JPEG ("baseline"), PNG ("lossless") and
//!   WebP ("modern", lossless)
//! - Mapping the 0..1 export quality onto the JPEG 1..100 scale
//!
//! # Examples
//!
//! ```ignore
//! use framewright_core::encode::{encode, ExportFormat};
//!
//! let bytes = encode(&image, ExportFormat::Jpeg, 0.9)?;
//! ```

mod raster;

pub use raster::{encode, encode_jpeg, encode_png, encode_webp, jpeg_quality, EncodeError, ExportFormat};
