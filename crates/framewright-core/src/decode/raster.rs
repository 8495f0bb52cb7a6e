//! Raster decoding (JPEG, PNG, WebP) with EXIF orientation handling.
//!
//! Decoded images come out already upright, so a photo's `rotation` field
//! only ever carries the user's own 90° turns.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// The format is sniffed from the content; the file extension plays no part.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if the data is truncated or corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = read_dynamic(bytes)?;
    Ok(DecodedImage::from_rgba_image(
        apply_orientation(img, orientation).into_rgba8(),
    ))
}

/// Decode an image from bytes without applying EXIF orientation.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = read_dynamic(bytes)?;
    Ok(DecodedImage::from_rgba_image(img.into_rgba8()))
}

/// Extract EXIF orientation value from image bytes (for external use).
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn read_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Returns `Orientation::Upright` when there is no readable EXIF block.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from_exif)
            .unwrap_or_default(),
        Err(_) => Orientation::Upright,
    }
}

/// Mirror first, then turn clockwise.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    let (mirror, turns) = orientation.correction();
    let img = if mirror { img.fliph() } else { img };
    match turns {
        1 => img.rotate90(),
        2 => img.rotate180(),
        3 => img.rotate270(),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    /// Encode a small RGBA image to PNG bytes.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut img = image::RgbaImage::new(width, height);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = image::Rgba([(x * 40) as u8, (y * 40) as u8, 10, 200]);
        }
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_keeps_alpha() {
        let img = decode_image(&png_bytes(3, 2)).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixel(2, 1), [80, 40, 10, 200]);
    }

    #[test]
    fn test_decode_no_orientation_matches_plain_png() {
        let bytes = png_bytes(4, 4);
        assert_eq!(
            decode_image(&bytes).unwrap(),
            decode_image_no_orientation(&bytes).unwrap()
        );
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = png_bytes(8, 8);
        let result = decode_image(&bytes[..40]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(get_orientation(&png_bytes(2, 2)), Orientation::Upright);
        assert_eq!(get_orientation(&[0x00, 0x01]), Orientation::Upright);
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(2, 1));
        let result = apply_orientation(img, Orientation::QuarterRight);
        assert_eq!((result.width(), result.height()), (1, 2));
    }

    #[test]
    fn test_transpose_swaps_coordinates() {
        let mut src = image::RgbaImage::new(3, 2);
        src.put_pixel(2, 0, image::Rgba([9, 9, 9, 255]));
        let result = apply_orientation(DynamicImage::ImageRgba8(src), Orientation::MirroredQuarterLeft)
            .into_rgba8();
        assert_eq!(result.dimensions(), (2, 3));
        assert_eq!(result.get_pixel(0, 2).0, [9, 9, 9, 255]);
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let mut src = image::RgbaImage::new(2, 1);
        src.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, image::Rgba([0, 255, 0, 255]));
        let result = apply_orientation(DynamicImage::ImageRgba8(src), Orientation::Mirrored)
            .into_rgba8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }
}
