//! Editing session.
//!
//! [`Editor`] owns the history of collections and every piece of session
//! state around it: config, adjustment engine, filter cache, the drag state
//! machine and the selected photo. All edits go through two paths:
//!
//! - live edits ([`EditPhase::Live`]) overwrite the current snapshot and
//!   remember the collection they started from;
//! - commits ([`EditPhase::Commit`]) record one history step from that
//!   starting point, so a whole drag undoes in one go.
//!
//! Whole-collection batches live in `jobs`, rendering and export in
//! `render`.

mod jobs;
mod render;

use thiserror::Error;
use tracing::{debug, warn};

use crate::batch::BatchError;
use crate::cache::{CacheStats, FilterCache};
use crate::config::EditorConfig;
use crate::decode::{decode_image, generate_thumbnail, DecodeError, DecodedImage};
use crate::engine::AdjustmentEngine;
use crate::export::ExportError;
use crate::history::History;
use crate::interaction::{
    DragOutcome, InteractionContext, InteractionController, InteractionMode, PointerEvent,
    SnapGuides,
};
use crate::model::{Collection, CropRect, ImageHandle, LogoId, LogoLayer, Photo, PhotoId};
use crate::transform::{
    active_viewport, apply_aspect_ratio, clamp_crop, effective_dimensions, full_rect, AspectPreset,
    DisplayMapping, ScreenPoint,
};
use crate::Adjustments;

pub use jobs::BatchOp;
pub use render::ExportedFile;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("unknown photo {}", .0.get())]
    UnknownPhoto(PhotoId),

    #[error("photo {} has no logo {}", .photo.get(), .logo.get())]
    UnknownLogo { photo: PhotoId, logo: LogoId },

    #[error("image {name} has no pixels")]
    EmptyImage { name: String },

    #[error("no batch in progress")]
    NoBatch,

    /// The collection was edited between the start and the end of a
    /// stepped batch; its result was dropped.
    #[error("collection changed while the batch was running")]
    BatchInterrupted,

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Whether an edit is an in-progress preview or a finished change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPhase {
    /// Overwrite the current snapshot; nothing is recorded yet.
    Live,
    /// Record one undoable step.
    #[default]
    Commit,
}

/// Outcome of importing several encoded files.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub added: Vec<PhotoId>,
    /// Files that failed to decode, with the reason.
    pub skipped: Vec<(String, DecodeError)>,
}

pub struct Editor {
    history: History<Collection>,
    config: EditorConfig,
    engine: AdjustmentEngine,
    cache: FilterCache,
    interaction: InteractionController,
    mode: InteractionMode,
    current: Option<PhotoId>,
    /// Collection before the first live edit of the pending gesture.
    baseline: Option<Collection>,
    clipboard: Option<Adjustments>,
    batch: Option<jobs::PendingBatch>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("photos", &self.history.current().len())
            .field("history_index", &self.history.index())
            .field("backend", &self.engine.backend_name())
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("batch", &self.batch)
            .finish()
    }
}

impl Editor {
    /// A CPU-only editor.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_engine(config, AdjustmentEngine::cpu())
    }

    pub fn with_engine(config: EditorConfig, engine: AdjustmentEngine) -> Self {
        Self {
            history: History::new(Collection::new()),
            config: config.validated(),
            engine,
            cache: FilterCache::new(),
            interaction: InteractionController::new(),
            mode: InteractionMode::Crop { ratio: None },
            current: None,
            baseline: None,
            clipboard: None,
            batch: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.engine.backend_name()
    }

    pub fn collection(&self) -> &Collection {
        self.history.current()
    }

    pub fn photo(&self, id: PhotoId) -> Option<&Photo> {
        self.collection().get(id)
    }

    /// The selected photo, if it is still in the collection.
    pub fn current_photo(&self) -> Option<&Photo> {
        self.current.and_then(|id| self.photo(id))
    }

    pub fn select_photo(&mut self, id: PhotoId) -> Result<(), EditError> {
        self.require(id)?;
        if self.current != Some(id) {
            self.interaction.reset();
            self.interaction.select_logo(None);
        }
        self.current = Some(id);
        Ok(())
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.interaction.reset();
        self.mode = mode;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn require(&self, id: PhotoId) -> Result<&Photo, EditError> {
        self.photo(id).ok_or(EditError::UnknownPhoto(id))
    }

    fn record(&mut self, next: Collection, phase: EditPhase) {
        match phase {
            EditPhase::Live => {
                if self.baseline.is_none() {
                    self.baseline = Some(self.history.current().clone());
                }
                self.history.set(next);
            }
            EditPhase::Commit => {
                if let Some(baseline) = self.baseline.take() {
                    self.history.set(baseline);
                }
                if next == *self.history.current() {
                    return;
                }
                self.history.push(next);
            }
        }
    }

    /// Put back the collection a pending live edit started from.
    fn cancel_live(&mut self) {
        if let Some(baseline) = self.baseline.take() {
            self.history.set(baseline);
        }
        self.interaction.reset();
    }

    fn edit_photo(
        &mut self,
        id: PhotoId,
        phase: EditPhase,
        f: impl FnOnce(&Photo) -> Photo,
    ) -> Result<(), EditError> {
        let next = self
            .collection()
            .update(id, f)
            .ok_or(EditError::UnknownPhoto(id))?;
        self.record(next, phase);
        Ok(())
    }

    fn edit_logo(
        &mut self,
        id: PhotoId,
        logo: LogoId,
        f: impl FnOnce(&Photo, usize) -> Photo,
    ) -> Result<(), EditError> {
        let index = self
            .require(id)?
            .logos
            .iter()
            .position(|l| l.id == logo)
            .ok_or(EditError::UnknownLogo { photo: id, logo })?;
        self.edit_photo(id, EditPhase::Commit, |p| f(p, index))
    }

    // -- photos --

    /// Add a decoded photo. A thumbnail is generated when none is given.
    ///
    /// A source without pixels is rejected.
    pub fn add_photo(
        &mut self,
        name: impl Into<String>,
        source: DecodedImage,
        thumbnail: Option<DecodedImage>,
    ) -> Result<PhotoId, EditError> {
        let name = name.into();
        let source = non_empty(source, &name)?;
        let thumbnail = thumbnail.filter(|t| !t.is_empty());
        let photo = self.build_photo(name, source, thumbnail);
        let id = photo.id;
        self.cancel_live();
        let next = self.collection().append(photo);
        self.history.push(next);
        if self.current.is_none() {
            self.current = Some(id);
        }
        Ok(id)
    }

    fn build_photo(&self, name: String, source: DecodedImage, thumbnail: Option<DecodedImage>) -> Photo {
        let source = ImageHandle::new(source);
        let thumbnail = match thumbnail {
            Some(thumb) => ImageHandle::new(thumb),
            None => match generate_thumbnail(source.image(), self.config.thumbnail_size) {
                Ok(thumb) if thumb.width == source.width() && thumb.height == source.height() => {
                    source.clone()
                }
                Ok(thumb) => ImageHandle::new(thumb),
                Err(_) => source.clone(),
            },
        };
        Photo::new(name, source, thumbnail)
    }

    /// Decode and add several files in one history step.
    ///
    /// Files that fail to decode are skipped and reported; the rest are
    /// still added.
    pub fn import<I, N, B>(&mut self, files: I) -> ImportReport
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: AsRef<[u8]>,
    {
        let mut report = ImportReport::default();
        let mut next = self.collection().clone();
        for (name, bytes) in files {
            let name = name.into();
            let decoded = decode_image(bytes.as_ref()).and_then(|image| {
                if image.is_empty() {
                    Err(DecodeError::CorruptedFile("image has no pixels".into()))
                } else {
                    Ok(image)
                }
            });
            match decoded {
                Ok(source) => {
                    let photo = self.build_photo(name, source, None);
                    report.added.push(photo.id);
                    next = next.append(photo);
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "skipping import");
                    report.skipped.push((name, e));
                }
            }
        }
        if !report.added.is_empty() {
            self.cancel_live();
            self.history.push(next);
            self.current = self.current.or(report.added.first().copied());
        }
        report
    }

    /// Remove a photo. Its pixels stay alive while history references them.
    pub fn remove_photo(&mut self, id: PhotoId) -> Result<(), EditError> {
        self.cancel_live();
        let index = self.collection().index_of(id).ok_or(EditError::UnknownPhoto(id))?;
        let next = self.collection().remove(id).ok_or(EditError::UnknownPhoto(id))?;
        if self.current == Some(id) {
            let neighbor = index.min(next.len().saturating_sub(1));
            self.current = next.at(neighbor).map(|p| p.id);
        }
        self.cache.invalidate(id);
        self.history.push(next);
        Ok(())
    }

    pub fn reorder_photo(&mut self, id: PhotoId, to: usize) -> Result<(), EditError> {
        self.cancel_live();
        let next = self.collection().reorder(id, to).ok_or(EditError::UnknownPhoto(id))?;
        self.record(next, EditPhase::Commit);
        Ok(())
    }

    // -- geometry --

    /// Quarter-turn; the crop is dropped.
    pub fn rotate(&mut self, id: PhotoId, clockwise: bool) -> Result<(), EditError> {
        self.edit_photo(id, EditPhase::Commit, |p| {
            let rotation = if clockwise {
                p.rotation.clockwise()
            } else {
                p.rotation.counter_clockwise()
            };
            p.with_rotation(rotation)
        })
    }

    pub fn set_straighten(&mut self, id: PhotoId, degrees: f64, phase: EditPhase) -> Result<(), EditError> {
        self.edit_photo(id, phase, |p| p.with_straighten(degrees))
    }

    /// Set the crop, clamped into the oriented bounds. `None` clears it.
    pub fn set_crop(&mut self, id: PhotoId, crop: Option<CropRect>) -> Result<(), EditError> {
        self.edit_photo(id, EditPhase::Commit, |p| {
            let (w, h) = effective_dimensions(p);
            p.with_crop(crop.map(|c| clamp_crop(c, w as f64, h as f64)))
        })
    }

    pub fn clear_crop(&mut self, id: PhotoId) -> Result<(), EditError> {
        self.set_crop(id, None)
    }

    /// Lock the crop to `ratio` (width / height) and refit the crop.
    /// `None` unlocks the ratio and keeps the crop.
    pub fn apply_aspect_ratio(&mut self, id: PhotoId, ratio: Option<f64>) -> Result<(), EditError> {
        self.require(id)?;
        let ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
        self.mode = InteractionMode::Crop { ratio };
        let Some(r) = ratio else {
            return Ok(());
        };
        self.edit_photo(id, EditPhase::Commit, |p| {
            let (w, h) = effective_dimensions(p);
            p.with_crop(Some(apply_aspect_ratio(p.crop, r, w as f64, h as f64)))
        })
    }

    pub fn apply_aspect_preset(&mut self, id: PhotoId, preset: AspectPreset) -> Result<(), EditError> {
        self.apply_aspect_ratio(id, preset.ratio())
    }

    // -- adjustments --

    pub fn set_adjustments(
        &mut self,
        id: PhotoId,
        adjustments: Adjustments,
        phase: EditPhase,
    ) -> Result<(), EditError> {
        self.edit_photo(id, phase, |p| p.with_adjustments(adjustments))
    }

    pub fn reset_adjustments(&mut self, id: PhotoId) -> Result<(), EditError> {
        self.set_adjustments(id, Adjustments::default(), EditPhase::Commit)
    }

    /// Remember a photo's adjustments for pasting or syncing.
    pub fn copy_adjustments(&mut self, id: PhotoId) -> Result<Adjustments, EditError> {
        let adjustments = self.require(id)?.adjustments;
        self.clipboard = Some(adjustments);
        Ok(adjustments)
    }

    pub fn copied_adjustments(&self) -> Option<Adjustments> {
        self.clipboard
    }

    /// Paste copied adjustments; `false` when nothing was copied.
    pub fn paste_adjustments(&mut self, id: PhotoId) -> Result<bool, EditError> {
        match self.clipboard {
            Some(adjustments) => {
                self.set_adjustments(id, adjustments, EditPhase::Commit)?;
                Ok(true)
            }
            None => {
                self.require(id)?;
                Ok(false)
            }
        }
    }

    // -- overlays --

    pub fn set_frame(&mut self, id: PhotoId, frame: Option<DecodedImage>) -> Result<(), EditError> {
        let frame = frame.map(|f| non_empty(f, "frame")).transpose()?.map(ImageHandle::new);
        self.edit_photo(id, EditPhase::Commit, |p| p.with_frame(frame))
    }

    pub fn clear_frame(&mut self, id: PhotoId) -> Result<(), EditError> {
        self.set_frame(id, None)
    }

    /// Add a centered logo at the default scale and select it.
    pub fn add_logo(&mut self, id: PhotoId, image: DecodedImage) -> Result<LogoId, EditError> {
        let image = non_empty(image, "logo")?;
        let layer = LogoLayer::new(ImageHandle::new(image), self.config.default_logo_scale);
        let logo = layer.id;
        self.edit_photo(id, EditPhase::Commit, |p| {
            let mut logos = p.logos.clone();
            logos.push(layer);
            p.with_logos(logos)
        })?;
        self.interaction.select_logo(Some(logo));
        Ok(logo)
    }

    pub fn remove_logo(&mut self, id: PhotoId, logo: LogoId) -> Result<(), EditError> {
        self.edit_logo(id, logo, |p, index| {
            let mut logos = p.logos.clone();
            logos.remove(index);
            p.with_logos(logos)
        })?;
        if self.interaction.active_logo() == Some(logo) {
            self.interaction.select_logo(None);
        }
        Ok(())
    }

    /// Move a logo to the end of the stack, where it paints on top.
    pub fn bring_logo_to_front(&mut self, id: PhotoId, logo: LogoId) -> Result<(), EditError> {
        self.edit_logo(id, logo, |p, index| {
            let mut logos = p.logos.clone();
            let layer = logos.remove(index);
            logos.push(layer);
            p.with_logos(logos)
        })
    }

    pub fn select_logo(&mut self, id: PhotoId, logo: Option<LogoId>) -> Result<(), EditError> {
        let photo = self.require(id)?;
        if let Some(logo) = logo {
            if photo.logo(logo).is_none() {
                return Err(EditError::UnknownLogo { photo: id, logo });
            }
        }
        self.interaction.select_logo(logo);
        Ok(())
    }

    pub fn active_logo(&self) -> Option<LogoId> {
        self.interaction.active_logo()
    }

    /// Shift a logo by a fraction of the viewport, staying inside it.
    pub fn nudge_logo(&mut self, id: PhotoId, logo: LogoId, dx: f64, dy: f64) -> Result<(), EditError> {
        self.edit_logo(id, logo, |p, index| {
            let mut logos = p.logos.clone();
            let layer = &mut logos[index];
            layer.x = (layer.x + dx).clamp(0.0, 1.0);
            layer.y = (layer.y + dy).clamp(0.0, 1.0);
            p.with_logos(logos)
        })
    }

    // -- pointer --

    /// How the photo is laid out on screen in the current mode: the full
    /// oriented image in crop mode, the viewport in logo mode.
    pub fn display_mapping(&self, id: PhotoId, origin: ScreenPoint, scale: f64) -> Result<DisplayMapping, EditError> {
        let photo = self.require(id)?;
        let shown = match self.mode {
            InteractionMode::Crop { .. } => full_rect(photo),
            InteractionMode::Logo => active_viewport(photo),
        };
        Ok(DisplayMapping::new(shown, origin, scale))
    }

    /// Feed a pointer event. Drag steps are live edits; the end of a drag
    /// commits them as one step.
    pub fn pointer(
        &mut self,
        id: PhotoId,
        mapping: DisplayMapping,
        event: PointerEvent,
    ) -> Result<DragOutcome, EditError> {
        let photo = self.require(id)?.clone();
        let ctx = InteractionContext {
            mode: self.mode,
            mapping,
            config: &self.config,
        };
        let outcome = self.interaction.dispatch(&photo, &ctx, event);
        match &outcome {
            DragOutcome::Updated(next) => {
                let next = self
                    .collection()
                    .replace(next.clone())
                    .ok_or(EditError::UnknownPhoto(id))?;
                self.record(next, EditPhase::Live);
            }
            DragOutcome::Finished => {
                if self.baseline.is_some() {
                    let next = self.collection().clone();
                    self.record(next, EditPhase::Commit);
                }
            }
            DragOutcome::Started | DragOutcome::Ignored => {}
        }
        Ok(outcome)
    }

    pub fn snap_guides(&self) -> SnapGuides {
        self.interaction.guides()
    }

    // -- history --

    /// Step back. A pending live edit is discarded first.
    pub fn undo(&mut self) -> bool {
        self.cancel_live();
        let moved = self.history.undo();
        if moved {
            debug!(index = self.history.index(), "undo");
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_live();
        let moved = self.history.redo();
        if moved {
            debug!(index = self.history.index(), "redo");
        }
        moved
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

fn non_empty(image: DecodedImage, name: &str) -> Result<DecodedImage, EditError> {
    if image.is_empty() {
        return Err(EditError::EmptyImage { name: name.to_string() });
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{DragState, PointerKind};
    use crate::model::Rotation;

    pub(super) fn editor_with(n: usize, width: u32, height: u32) -> (Editor, Vec<PhotoId>) {
        let mut editor = Editor::default();
        let ids = (0..n)
            .map(|i| {
                editor
                    .add_photo(
                        format!("img{i}.jpg"),
                        DecodedImage::filled(width, height, [120, 110, 100, 255]),
                        None,
                    )
                    .unwrap()
            })
            .collect();
        (editor, ids)
    }

    fn png_bytes() -> Vec<u8> {
        crate::encode::encode_png(&[10, 20, 30, 255].repeat(4), 2, 2).unwrap()
    }

    #[test]
    fn test_add_generates_thumbnail() {
        let (editor, ids) = editor_with(1, 1024, 512);
        let p = editor.photo(ids[0]).unwrap();
        assert_eq!((p.thumbnail.width(), p.thumbnail.height()), (256, 128));
        assert_eq!((p.natural_width, p.natural_height), (1024, 512));
        assert_eq!(editor.current_photo().map(|p| p.id), Some(ids[0]));
    }

    #[test]
    fn test_small_photo_shares_source_as_thumbnail() {
        let (editor, ids) = editor_with(1, 40, 30);
        let p = editor.photo(ids[0]).unwrap();
        assert_eq!(p.thumbnail, p.source);
    }

    #[test]
    fn test_empty_images_are_rejected() {
        let (mut editor, ids) = editor_with(1, 8, 8);
        let len = editor.history_len();

        let err = editor.add_photo("blank.png", DecodedImage::filled(0, 0, [0; 4]), None);
        assert!(matches!(err, Err(EditError::EmptyImage { ref name }) if name == "blank.png"));
        let err = editor.add_photo("strip.png", DecodedImage::filled(0, 40, [0; 4]), None);
        assert!(matches!(err, Err(EditError::EmptyImage { .. })));
        assert!(matches!(
            editor.add_logo(ids[0], DecodedImage::filled(5, 0, [0; 4])),
            Err(EditError::EmptyImage { .. })
        ));
        assert!(matches!(
            editor.set_frame(ids[0], Some(DecodedImage::filled(0, 0, [0; 4]))),
            Err(EditError::EmptyImage { .. })
        ));

        assert_eq!(editor.collection().len(), 1);
        assert_eq!(editor.history_len(), len);
        // every photo left in the collection can take a preset
        editor.apply_aspect_preset(ids[0], AspectPreset::Square).unwrap();
    }

    #[test]
    fn test_empty_thumbnail_is_regenerated() {
        let mut editor = Editor::default();
        let id = editor
            .add_photo(
                "wide.png",
                DecodedImage::filled(1024, 512, [1, 2, 3, 255]),
                Some(DecodedImage::filled(0, 0, [0; 4])),
            )
            .unwrap();
        let p = editor.photo(id).unwrap();
        assert_eq!((p.thumbnail.width(), p.thumbnail.height()), (256, 128));
    }

    #[test]
    fn test_remove_then_undo_keeps_pixels() {
        let (mut editor, ids) = editor_with(3, 20, 10);
        let source = editor.photo(ids[1]).unwrap().source.clone();

        editor.remove_photo(ids[1]).unwrap();
        assert!(editor.photo(ids[1]).is_none());
        assert_eq!(editor.collection().len(), 2);
        // still referenced by the earlier snapshot
        assert!(source.ref_count() > 1);

        assert!(editor.undo());
        let back = editor.photo(ids[1]).unwrap();
        assert_eq!(back.source, source);
        assert_eq!(back.source.image().pixel(0, 0), [120, 110, 100, 255]);
        assert_eq!(editor.collection().index_of(ids[1]), Some(1));
    }

    #[test]
    fn test_remove_current_selects_neighbor() {
        let (mut editor, ids) = editor_with(3, 8, 8);
        editor.select_photo(ids[2]).unwrap();
        editor.remove_photo(ids[2]).unwrap();
        assert_eq!(editor.current_photo().map(|p| p.id), Some(ids[1]));
        assert!(matches!(
            editor.remove_photo(ids[2]),
            Err(EditError::UnknownPhoto(_))
        ));
    }

    #[test]
    fn test_import_skips_undecodable_files() {
        let mut editor = Editor::default();
        let report = editor.import(vec![
            ("good.png", png_bytes()),
            ("broken.jpg", vec![0u8, 1, 2, 3]),
            ("also-good.png", png_bytes()),
        ]);
        assert_eq!(report.added.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "broken.jpg");
        assert_eq!(editor.collection().len(), 2);
        // one step for the whole import
        assert_eq!(editor.history_len(), 2);
    }

    #[test]
    fn test_rotation_drops_crop_and_cycles() {
        let (mut editor, ids) = editor_with(1, 400, 300);
        let id = ids[0];
        editor.set_crop(id, Some(CropRect::new(10.0, 10.0, 100.0, 100.0))).unwrap();
        editor.rotate(id, true).unwrap();
        assert_eq!(editor.photo(id).unwrap().crop, None);
        for _ in 0..3 {
            editor.rotate(id, true).unwrap();
        }
        assert_eq!(editor.photo(id).unwrap().rotation, Rotation::Deg0);
        editor.rotate(id, false).unwrap();
        assert_eq!(editor.photo(id).unwrap().rotation, Rotation::Deg270);
    }

    #[test]
    fn test_set_crop_is_clamped() {
        let (mut editor, ids) = editor_with(1, 400, 300);
        editor
            .set_crop(ids[0], Some(CropRect::new(350.0, -20.0, 100.0, 100.0)))
            .unwrap();
        assert_eq!(
            editor.photo(ids[0]).unwrap().crop,
            Some(CropRect::new(300.0, 0.0, 100.0, 100.0))
        );
    }

    #[test]
    fn test_aspect_preset_square_from_full_rect() {
        let (mut editor, ids) = editor_with(1, 4000, 3000);
        let id = ids[0];
        editor.rotate(id, true).unwrap();
        editor.apply_aspect_preset(id, AspectPreset::Square).unwrap();
        let crop = editor.photo(id).unwrap().crop.unwrap();
        assert!((crop.width - 3000.0).abs() < 1e-6);
        assert!((crop.height - 3000.0).abs() < 1e-6);
        assert!(crop.x.abs() < 1e-6);
        assert!((crop.y - 500.0).abs() < 1e-6);
        assert_eq!(editor.mode(), InteractionMode::Crop { ratio: Some(1.0) });

        // same ratio again records nothing
        let len = editor.history_len();
        editor.apply_aspect_preset(id, AspectPreset::Square).unwrap();
        assert_eq!(editor.history_len(), len);
    }

    #[test]
    fn test_live_edits_commit_as_one_step() {
        let (mut editor, ids) = editor_with(1, 16, 16);
        let id = ids[0];
        let before = editor.history_len();
        for deg in [5.0, 10.0, 15.0] {
            editor.set_straighten(id, deg, EditPhase::Live).unwrap();
        }
        assert_eq!(editor.history_len(), before);
        editor.set_straighten(id, 20.0, EditPhase::Commit).unwrap();
        assert_eq!(editor.history_len(), before + 1);
        assert_eq!(editor.photo(id).unwrap().straighten, 20.0);

        assert!(editor.undo());
        assert_eq!(editor.photo(id).unwrap().straighten, 0.0);
        assert!(editor.redo());
        assert_eq!(editor.photo(id).unwrap().straighten, 20.0);
    }

    #[test]
    fn test_undo_discards_pending_live_edit() {
        let (mut editor, ids) = editor_with(1, 16, 16);
        let id = ids[0];
        editor.reset_adjustments(id).unwrap();
        editor
            .set_adjustments(
                id,
                Adjustments {
                    contrast: 40.0,
                    ..Default::default()
                },
                EditPhase::Commit,
            )
            .unwrap();
        editor
            .set_adjustments(
                id,
                Adjustments {
                    contrast: 90.0,
                    ..Default::default()
                },
                EditPhase::Live,
            )
            .unwrap();
        assert!(editor.undo());
        assert_eq!(editor.photo(id).unwrap().adjustments, Adjustments::default());
        assert!(editor.redo());
        assert_eq!(editor.photo(id).unwrap().adjustments.contrast, 40.0);
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_crop_drag_commits_once() {
        let (mut editor, ids) = editor_with(1, 400, 300);
        let id = ids[0];
        editor.set_crop(id, Some(CropRect::new(100.0, 100.0, 100.0, 100.0))).unwrap();
        let mapping = editor.display_mapping(id, ScreenPoint::new(0.0, 0.0), 1.0).unwrap();
        let before = editor.history_len();

        let start = editor.pointer(id, mapping, PointerEvent::down(150.0, 150.0)).unwrap();
        assert_eq!(start, DragOutcome::Started);
        for step in 1..=4 {
            let x = 150.0 + step as f64 * 10.0;
            let out = editor.pointer(id, mapping, PointerEvent::drag(x, 150.0)).unwrap();
            assert!(matches!(out, DragOutcome::Updated(_)));
        }
        assert_eq!(editor.history_len(), before);
        let end = editor
            .pointer(id, mapping, PointerEvent::with_kind(PointerKind::CaptureLost, 190.0, 150.0))
            .unwrap();
        assert_eq!(end, DragOutcome::Finished);
        assert_eq!(editor.history_len(), before + 1);
        assert_eq!(
            editor.photo(id).unwrap().crop,
            Some(CropRect::new(140.0, 100.0, 100.0, 100.0))
        );

        editor.undo();
        assert_eq!(
            editor.photo(id).unwrap().crop,
            Some(CropRect::new(100.0, 100.0, 100.0, 100.0))
        );
    }

    #[test]
    fn test_drag_back_to_start_records_nothing() {
        let (mut editor, ids) = editor_with(1, 400, 300);
        let id = ids[0];
        editor.set_crop(id, Some(CropRect::new(100.0, 100.0, 100.0, 100.0))).unwrap();
        editor.rotate(id, true).unwrap();
        editor.set_crop(id, Some(CropRect::new(50.0, 50.0, 100.0, 100.0))).unwrap();
        let mapping = editor.display_mapping(id, ScreenPoint::new(0.0, 0.0), 1.0).unwrap();
        let len = editor.history_len();
        let before = editor.collection().clone();

        editor.pointer(id, mapping, PointerEvent::down(100.0, 100.0)).unwrap();
        editor.pointer(id, mapping, PointerEvent::drag(100.0, 100.0)).unwrap();
        editor.pointer(id, mapping, PointerEvent::drag(130.0, 120.0)).unwrap();
        editor.pointer(id, mapping, PointerEvent::drag(100.0, 100.0)).unwrap();
        let end = editor.pointer(id, mapping, PointerEvent::up(100.0, 100.0)).unwrap();
        assert_eq!(end, DragOutcome::Finished);

        assert_eq!(editor.history_len(), len);
        assert_eq!(*editor.collection(), before);
        // undo still goes to the previous real edit
        assert!(editor.undo());
        assert_eq!(editor.photo(id).unwrap().crop, None);
    }

    #[test]
    fn test_logo_lifecycle() {
        let (mut editor, ids) = editor_with(1, 200, 100);
        let id = ids[0];
        let a = editor.add_logo(id, DecodedImage::filled(10, 10, [255, 0, 0, 255])).unwrap();
        let b = editor.add_logo(id, DecodedImage::filled(10, 10, [0, 255, 0, 255])).unwrap();
        assert_eq!(editor.active_logo(), Some(b));
        let logo = editor.photo(id).unwrap().logo(a).unwrap();
        assert_eq!((logo.x, logo.y, logo.scale), (0.5, 0.5, 0.2));

        editor.bring_logo_to_front(id, a).unwrap();
        let order: Vec<_> = editor.photo(id).unwrap().logos.iter().map(|l| l.id).collect();
        assert_eq!(order, vec![b, a]);

        editor.nudge_logo(id, a, 0.7, -0.1).unwrap();
        let logo = editor.photo(id).unwrap().logo(a).unwrap();
        assert_eq!(logo.x, 1.0);
        assert!((logo.y - 0.4).abs() < 1e-12);

        editor.remove_logo(id, b).unwrap();
        assert_eq!(editor.active_logo(), None);
        assert!(matches!(
            editor.remove_logo(id, b),
            Err(EditError::UnknownLogo { .. })
        ));
        assert!(editor.select_logo(id, Some(b)).is_err());
    }

    #[test]
    fn test_logo_drag_in_logo_mode() {
        let (mut editor, ids) = editor_with(1, 200, 100);
        let id = ids[0];
        let logo = editor.add_logo(id, DecodedImage::filled(10, 10, [0, 0, 0, 255])).unwrap();
        editor.set_mode(InteractionMode::Logo);
        let mapping = editor.display_mapping(id, ScreenPoint::new(0.0, 0.0), 2.0).unwrap();

        editor.pointer(id, mapping, PointerEvent::down(200.0, 100.0)).unwrap();
        editor.pointer(id, mapping, PointerEvent::drag(300.0, 100.0)).unwrap();
        let stray = PointerEvent {
            buttons_down: false,
            ..PointerEvent::drag(300.0, 100.0)
        };
        assert_eq!(editor.pointer(id, mapping, stray).unwrap(), DragOutcome::Finished);
        let moved = editor.photo(id).unwrap().logo(logo).unwrap();
        assert!((moved.x - 0.75).abs() < 1e-9);
        assert_eq!(moved.y, 0.5);
    }

    #[test]
    fn test_undo_during_drag_resets_controller() {
        let (mut editor, ids) = editor_with(1, 400, 300);
        let id = ids[0];
        editor.set_crop(id, Some(CropRect::new(100.0, 100.0, 100.0, 100.0))).unwrap();
        let mapping = editor.display_mapping(id, ScreenPoint::new(0.0, 0.0), 1.0).unwrap();
        editor.pointer(id, mapping, PointerEvent::down(150.0, 150.0)).unwrap();
        editor.pointer(id, mapping, PointerEvent::drag(170.0, 150.0)).unwrap();

        assert!(editor.undo());
        assert_eq!(editor.photo(id).unwrap().crop, None);
        let up = editor.pointer(id, mapping, PointerEvent::up(170.0, 150.0)).unwrap();
        assert_eq!(up, DragOutcome::Ignored);
        assert_eq!(*editor.interaction.state(), DragState::Idle);
    }
}
