//! Reference-counted image handles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::decode::DecodedImage;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an image handle. Two handles with the same id share pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A decoded raster shared between a photo and every snapshot that
/// references it.
///
/// Cloning is cheap. The pixels are freed once the last clone is dropped,
/// so an image removed from the live collection stays valid for as long as
/// an undo snapshot still points at it.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    id: HandleId,
    pixels: Arc<DecodedImage>,
}

impl ImageHandle {
    /// Wrap a decoded image under a fresh identity.
    pub fn new(image: DecodedImage) -> Self {
        Self::from_arc(Arc::new(image))
    }

    pub fn from_arc(pixels: Arc<DecodedImage>) -> Self {
        Self {
            id: HandleId(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)),
            pixels,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn image(&self) -> &DecodedImage {
        &self.pixels
    }

    pub fn shared(&self) -> Arc<DecodedImage> {
        Arc::clone(&self.pixels)
    }

    /// Stored pixel width (may be smaller than the photo's natural width).
    pub fn width(&self) -> u32 {
        self.pixels.width
    }

    pub fn height(&self) -> u32 {
        self.pixels.height
    }

    /// Number of live references to the pixel buffer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.pixels)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ImageHandle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handles_get_distinct_ids() {
        let a = ImageHandle::new(DecodedImage::filled(2, 2, [1, 2, 3, 255]));
        let b = ImageHandle::new(DecodedImage::filled(2, 2, [1, 2, 3, 255]));
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_shares_pixels_and_identity() {
        let a = ImageHandle::new(DecodedImage::filled(3, 1, [0, 0, 0, 255]));
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.ref_count(), 2);
        drop(b);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn test_dimensions() {
        let a = ImageHandle::new(DecodedImage::transparent(7, 5));
        assert_eq!((a.width(), a.height()), (7, 5));
    }
}
