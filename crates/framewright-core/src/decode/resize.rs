//! Resampling for thumbnails, frame stretching and export output sizes.
//!
//! Thin wrappers over `image::imageops`; inputs are never modified.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize to exactly `width x height`.
///
/// # Errors
///
/// `DecodeError::InvalidFormat` for a zero target side, and
/// `DecodeError::BufferMismatch` when the source buffer is inconsistent.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    if (image.width, image.height) == (width, height) {
        return Ok(image.clone());
    }

    let rgba = image.to_rgba_image().ok_or(DecodeError::BufferMismatch {
        expected: image.width as usize * image.height as usize * 4,
        actual: image.pixels.len(),
    })?;
    let out = image::imageops::resize(&rgba, width, height, filter.to_image_filter());
    Ok(DecodedImage::from_rgba_image(out))
}

/// Shrink so the longest edge is at most `max_edge`. Images that already
/// fit come back unchanged; nothing is ever enlarged.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    match fit_within(image.width, image.height, max_edge) {
        Some((w, h)) => resize(image, w, h, filter),
        None => Ok(image.clone()),
    }
}

/// Grid thumbnail inside a `size x size` box.
pub fn generate_thumbnail(image: &DecodedImage, size: u32) -> Result<DecodedImage, DecodeError> {
    resize_to_fit(image, size, FilterType::Bilinear)
}

/// Target size for a downscale, or `None` when no resize is needed.
fn fit_within(width: u32, height: u32, max_edge: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_edge || width == 0 || height == 0 {
        return None;
    }
    let scale = max_edge as f64 / longest as f64;
    let side = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max_edge);
    Some((side(width), side(height)))
}
