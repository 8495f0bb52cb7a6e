//! Ordered, identity-keyed photo collection.

use std::sync::Arc;

use super::{Photo, PhotoId};

/// The unit of undo/redo.
///
/// Photos are held behind `Arc` so that snapshots share every photo they
/// did not change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    photos: Vec<Arc<Photo>>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_photos(photos: impl IntoIterator<Item = Photo>) -> Self {
        Self {
            photos: photos.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Photo> {
        self.photos.iter().map(|p| p.as_ref())
    }

    pub fn ids(&self) -> Vec<PhotoId> {
        self.photos.iter().map(|p| p.id).collect()
    }

    pub fn get(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id).map(|p| p.as_ref())
    }

    pub fn at(&self, index: usize) -> Option<&Photo> {
        self.photos.get(index).map(|p| p.as_ref())
    }

    pub fn index_of(&self, id: PhotoId) -> Option<usize> {
        self.photos.iter().position(|p| p.id == id)
    }

    /// A new collection with the photo of the same id replaced.
    pub fn replace(&self, photo: Photo) -> Option<Self> {
        let idx = self.index_of(photo.id)?;
        let mut photos = self.photos.clone();
        photos[idx] = Arc::new(photo);
        Some(Self { photos })
    }

    /// A new collection with `f` applied to one photo.
    pub fn update(&self, id: PhotoId, f: impl FnOnce(&Photo) -> Photo) -> Option<Self> {
        let photo = self.get(id)?;
        self.replace(f(photo))
    }

    /// A new collection with `photo` inserted at `index` (clamped to the end).
    pub fn insert(&self, index: usize, photo: Photo) -> Self {
        let mut photos = self.photos.clone();
        photos.insert(index.min(photos.len()), Arc::new(photo));
        Self { photos }
    }

    pub fn append(&self, photo: Photo) -> Self {
        self.insert(self.len(), photo)
    }

    pub fn remove(&self, id: PhotoId) -> Option<Self> {
        let idx = self.index_of(id)?;
        let mut photos = self.photos.clone();
        photos.remove(idx);
        Some(Self { photos })
    }

    /// Move a photo to `to` (clamped), shifting the others.
    pub fn reorder(&self, id: PhotoId, to: usize) -> Option<Self> {
        let from = self.index_of(id)?;
        let mut photos = self.photos.clone();
        let photo = photos.remove(from);
        photos.insert(to.min(photos.len()), photo);
        Some(Self { photos })
    }

    /// A new collection built from per-photo results, in order.
    pub fn from_arcs(photos: Vec<Arc<Photo>>) -> Self {
        Self { photos }
    }

    pub fn arc_at(&self, index: usize) -> Option<&Arc<Photo>> {
        self.photos.get(index)
    }

    /// True when both collections hold the very same allocation for `id`.
    pub fn shares_photo(&self, other: &Self, id: PhotoId) -> bool {
        match (self.index_of(id), other.index_of(id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&self.photos[a], &other.photos[b]),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use crate::model::{ImageHandle, Rotation};

    fn photo(name: &str) -> Photo {
        let h = ImageHandle::new(DecodedImage::transparent(4, 3));
        Photo::new(name, h.clone(), h)
    }

    fn three() -> Collection {
        Collection::from_photos([photo("a"), photo("b"), photo("c")])
    }

    #[test]
    fn test_update_shares_untouched_photos() {
        let c = three();
        let ids = c.ids();
        let next = c
            .update(ids[1], |p| p.with_rotation(Rotation::Deg90))
            .unwrap();

        assert_eq!(next.get(ids[1]).unwrap().rotation, Rotation::Deg90);
        assert_eq!(c.get(ids[1]).unwrap().rotation, Rotation::Deg0);
        assert!(next.shares_photo(&c, ids[0]));
        assert!(next.shares_photo(&c, ids[2]));
        assert!(!next.shares_photo(&c, ids[1]));
    }

    #[test]
    fn test_update_unknown_id() {
        let c = three();
        assert!(c.update(PhotoId::from(u64::MAX), |p| p.clone()).is_none());
    }

    #[test]
    fn test_insert_and_remove() {
        let c = three();
        let extra = photo("d");
        let id = extra.id;
        let bigger = c.insert(1, extra);
        assert_eq!(bigger.len(), 4);
        assert_eq!(bigger.index_of(id), Some(1));

        let smaller = bigger.remove(id).unwrap();
        assert_eq!(smaller, c);
        assert!(smaller.remove(id).is_none());
    }

    #[test]
    fn test_reorder() {
        let c = three();
        let ids = c.ids();
        let moved = c.reorder(ids[0], 2).unwrap();
        assert_eq!(moved.ids(), vec![ids[1], ids[2], ids[0]]);
        let back = moved.reorder(ids[0], 0).unwrap();
        assert_eq!(back.ids(), ids);
    }

    #[test]
    fn test_insert_past_end_appends() {
        let c = three();
        let p = photo("z");
        let id = p.id;
        assert_eq!(c.insert(99, p).index_of(id), Some(3));
    }
}
