//! Per-photo cache of filtered images.
//!
//! Entries are keyed by photo id and remember which source handle and which
//! adjustments produced them. Overlays composite after this cache, so moving
//! a logo or swapping the frame never re-runs the filter.
//!
//! Updates are recompute-then-swap: the new image is fully built before the
//! old entry is replaced, so a reader never observes a half-written result.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::decode::DecodedImage;
use crate::model::{HandleId, ImageHandle, PhotoId};
use crate::Adjustments;

#[derive(Debug, Clone)]
struct CacheEntry {
    source: HandleId,
    key: [u32; 6],
    image: Arc<DecodedImage>,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct FilterCache {
    entries: HashMap<PhotoId, CacheEntry>,
    stats: CacheStats,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the filtered image for `photo`, computing it on a miss.
    ///
    /// Identity adjustments return the source pixels without an entry.
    pub fn get_or_compute<F>(
        &mut self,
        photo: PhotoId,
        source: &ImageHandle,
        adjustments: &Adjustments,
        compute: F,
    ) -> Arc<DecodedImage>
    where
        F: FnOnce(&DecodedImage, &Adjustments) -> DecodedImage,
    {
        if adjustments.clamped().is_default() {
            return source.shared();
        }

        if let Some(hit) = self.peek(photo, source, adjustments) {
            self.stats.hits += 1;
            return hit;
        }

        self.stats.misses += 1;
        debug!(photo = photo.get(), source = source.id().get(), "filter cache miss");

        let image = Arc::new(compute(source.image(), adjustments));
        self.entries.insert(
            photo,
            CacheEntry {
                source: source.id(),
                key: adjustments.cache_key(),
                image: Arc::clone(&image),
            },
        );
        image
    }

    /// Look up a valid entry without computing.
    pub fn peek(
        &self,
        photo: PhotoId,
        source: &ImageHandle,
        adjustments: &Adjustments,
    ) -> Option<Arc<DecodedImage>> {
        self.entries
            .get(&photo)
            .filter(|e| e.source == source.id() && e.key == adjustments.cache_key())
            .map(|e| Arc::clone(&e.image))
    }

    pub fn invalidate(&mut self, photo: PhotoId) {
        self.entries.remove(&photo);
    }

    /// Drop entries for photos that are no longer live.
    pub fn retain(&mut self, mut live: impl FnMut(PhotoId) -> bool) {
        self.entries.retain(|id, _| live(*id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
