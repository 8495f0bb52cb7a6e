//! Preview, thumbnail and export rendering for an [`Editor`].

use std::sync::Arc;

use super::{EditError, Editor};
use crate::batch::{BatchProgress, BatchRunner};
use crate::decode::DecodedImage;
use crate::export::{compose, export_photo, ExportOptions, ExportedImage, NamingScheme};
use crate::model::{Photo, PhotoId};
use crate::transform::{active_viewport, fit_scale};

/// One file produced by [`Editor::export_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub name: String,
    pub image: ExportedImage,
}

impl Editor {
    /// Filtered source, from the cache when it is still valid.
    fn filtered_source(&mut self, photo: &Photo) -> Arc<DecodedImage> {
        let engine = &mut self.engine;
        self.cache.get_or_compute(photo.id, &photo.source, &photo.adjustments, |src, adj| {
            engine.apply(src, adj)
        })
    }

    /// Render the photo to fit `max_w x max_h`, overlays included.
    pub fn preview(&mut self, id: PhotoId, max_w: u32, max_h: u32) -> Result<DecodedImage, EditError> {
        let photo = self.require(id)?.clone();
        let scale = fit_scale(&active_viewport(&photo), max_w.max(1), max_h.max(1));
        let filtered = self.filtered_source(&photo);
        Ok(compose(&photo, &filtered, scale, self.config.preview_filter, true))
    }

    /// Grid thumbnail rendered from the stored thumbnail.
    pub fn thumbnail(&mut self, id: PhotoId) -> Result<DecodedImage, EditError> {
        let photo = self.require(id)?.clone();
        let size = self.config.thumbnail_size;
        let scale = fit_scale(&active_viewport(&photo), size, size);
        let filtered = self.engine.apply(photo.thumbnail.image(), &photo.adjustments);
        Ok(compose(&photo, &filtered, scale, self.config.preview_filter, true))
    }

    pub fn export(&mut self, id: PhotoId, options: &ExportOptions) -> Result<ExportedImage, EditError> {
        let photo = self.require(id)?.clone();
        Ok(export_photo(&photo, &mut self.engine, options)?)
    }

    /// Export every photo. The first failure aborts the job and nothing is
    /// returned.
    pub fn export_all(
        &mut self,
        options: &ExportOptions,
        naming: &NamingScheme,
        mut progress: impl FnMut(BatchProgress),
    ) -> Result<Vec<ExportedFile>, EditError> {
        let photos: Vec<Photo> = self.collection().iter().cloned().collect();
        let total = photos.len();
        let runner = BatchRunner::new(self.config.batch_chunk_size);
        let mut files = Vec::with_capacity(total);

        for chunk in photos.chunks(runner.chunk_size()) {
            for photo in chunk {
                let index = files.len();
                let image = export_photo(photo, &mut self.engine, options)?;
                files.push(ExportedFile {
                    name: naming.file_name(index, &photo.name, options.format),
                    image,
                });
            }
            progress(BatchProgress {
                done: files.len(),
                total,
                chunk_len: chunk.len(),
            });
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::editor_with;
    use super::*;
    use crate::editor::EditPhase;
    use crate::encode::ExportFormat;
    use crate::Adjustments;

    #[test]
    fn test_preview_reuses_filter_cache() {
        let (mut editor, ids) = editor_with(1, 64, 32);
        let id = ids[0];
        editor
            .set_adjustments(
                id,
                Adjustments {
                    saturation: -100.0,
                    ..Default::default()
                },
                EditPhase::Commit,
            )
            .unwrap();

        let first = editor.preview(id, 32, 32).unwrap();
        assert_eq!((first.width, first.height), (32, 16));
        editor.add_logo(id, DecodedImage::filled(4, 4, [255, 255, 255, 255])).unwrap();
        editor.preview(id, 32, 32).unwrap();
        assert_eq!(editor.cache_stats().misses, 1);
        assert_eq!(editor.cache_stats().hits, 1);

        let px = first.pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_thumbnail_fits_configured_size() {
        let (mut editor, ids) = editor_with(1, 1024, 512);
        let thumb = editor.thumbnail(ids[0]).unwrap();
        assert_eq!((thumb.width, thumb.height), (256, 128));
    }

    #[test]
    fn test_export_all_names_and_progress() {
        let (mut editor, _) = editor_with(7, 8, 6);
        let options = ExportOptions {
            format: ExportFormat::Png,
            ..Default::default()
        };
        let naming = NamingScheme::Sequential {
            prefix: "set".into(),
        };
        let mut progress = Vec::new();
        let files = editor
            .export_all(&options, &naming, |p| progress.push((p.done, p.total)))
            .unwrap();
        assert_eq!(files.len(), 7);
        assert_eq!(files[0].name, "set_001.png");
        assert_eq!(files[6].name, "set_007.png");
        assert_eq!(progress, vec![(5, 7), (7, 7)]);
        assert_eq!((files[3].image.width, files[3].image.height), (8, 6));
    }

    #[test]
    fn test_export_unknown_photo() {
        let mut editor = Editor::default();
        let err = editor.export(PhotoId::from(999_999), &ExportOptions::default());
        assert!(matches!(err, Err(EditError::UnknownPhoto(_))));
    }
}
