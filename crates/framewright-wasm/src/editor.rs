//! Editing session bindings.
//!
//! [`JsEditor`] owns one [`Editor`] on the CPU filter path. Photo and logo
//! ids cross the boundary as `u32`.
//!
//! ```typescript
//! import { JsEditor, decode_image } from '@framewright/wasm';
//!
//! const editor = new JsEditor({ batch_chunk_size: 5 });
//! const id = editor.import_file(file.name, new Uint8Array(await file.arrayBuffer()));
//! editor.rotate(id, true);
//! const preview = editor.preview(id, canvas.width, canvas.height);
//! ```

use framewright_core::batch::{BatchProgress, BatchStep};
use framewright_core::interaction::{DragOutcome, InteractionMode, PointerEvent, PointerKind};
use framewright_core::transform::{AspectPreset, ScreenPoint};
use framewright_core::{
    BatchOp, CropRect, EditPhase, Editor, EditorConfig, ExportOptions, LogoId, NamingScheme,
    PhotoId,
};
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::adjustments::JsAdjustments;
use crate::types::{js_error, JsDecodedImage};

fn photo_id(id: u32) -> PhotoId {
    PhotoId::from(u64::from(id))
}

fn logo_id(id: u32) -> LogoId {
    LogoId::from(u64::from(id))
}

fn phase(live: bool) -> EditPhase {
    if live {
        EditPhase::Live
    } else {
        EditPhase::Commit
    }
}

fn pointer_kind(kind: &str) -> Option<PointerKind> {
    match kind {
        "down" | "pointerdown" => Some(PointerKind::Down),
        "move" | "pointermove" => Some(PointerKind::Move),
        "up" | "pointerup" => Some(PointerKind::Up),
        "cancel" | "pointercancel" => Some(PointerKind::Cancel),
        "capturelost" | "lostpointercapture" => Some(PointerKind::CaptureLost),
        _ => None,
    }
}

/// Progress reporter calling `callback(done, total)` after every chunk.
fn js_progress(callback: Option<js_sys::Function>) -> impl FnMut(BatchProgress) {
    move |p: BatchProgress| {
        if let Some(f) = &callback {
            // progress is advisory; a throwing callback does not stop the batch
            let _ = f.call2(&JsValue::NULL, &JsValue::from(p.done as u32), &JsValue::from(p.total as u32));
        }
    }
}

/// A photo editing session.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create a session. `config` is an optional plain object; missing
    /// fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<EditorConfig>(config)
                .map_err(js_error)?
                .validated()
        };
        Ok(Self::with_config(config))
    }

    /// Name of the active filter backend.
    #[wasm_bindgen(getter)]
    pub fn backend(&self) -> String {
        self.inner.backend_name().to_string()
    }

    // -- photos --

    /// Add an already decoded photo; returns its id.
    pub fn add_photo(&mut self, name: &str, image: &JsDecodedImage) -> Result<u32, JsValue> {
        let source = image.to_decoded().map_err(js_error)?;
        self.inner
            .add_photo(name, source, None)
            .map(|id| id.get() as u32)
            .map_err(js_error)
    }

    /// Decode and add one file; returns its id.
    pub fn import_file(&mut self, name: &str, bytes: &[u8]) -> Result<u32, JsValue> {
        let mut report = self.inner.import([(name, bytes)]);
        if let Some((_, error)) = report.skipped.pop() {
            return Err(js_error(error));
        }
        report
            .added
            .first()
            .map(|id| id.get() as u32)
            .ok_or_else(|| js_error("nothing imported"))
    }

    pub fn remove_photo(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.remove_photo(photo_id(id)).map_err(js_error)
    }

    pub fn reorder_photo(&mut self, id: u32, to: usize) -> Result<(), JsValue> {
        self.inner.reorder_photo(photo_id(id), to).map_err(js_error)
    }

    /// Photo ids in display order.
    pub fn photo_ids(&self) -> Vec<u32> {
        self.inner.collection().ids().into_iter().map(|id| id.get() as u32).collect()
    }

    pub fn photo_name(&self, id: u32) -> Option<String> {
        self.inner.photo(photo_id(id)).map(|p| p.name.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn current_photo(&self) -> Option<u32> {
        self.inner.current_photo().map(|p| p.id.get() as u32)
    }

    pub fn select_photo(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.select_photo(photo_id(id)).map_err(js_error)
    }

    // -- geometry --

    pub fn rotate(&mut self, id: u32, clockwise: bool) -> Result<(), JsValue> {
        self.inner.rotate(photo_id(id), clockwise).map_err(js_error)
    }

    /// Quarter-turn rotation in degrees (0, 90, 180, 270).
    pub fn rotation(&self, id: u32) -> Option<i32> {
        self.inner.photo(photo_id(id)).map(|p| p.rotation.degrees())
    }

    /// Set the fine rotation. Pass `live = true` while a slider is moving and
    /// `false` on release so the whole gesture is one undo step.
    pub fn set_straighten(&mut self, id: u32, degrees: f64, live: bool) -> Result<(), JsValue> {
        self.inner
            .set_straighten(photo_id(id), degrees, phase(live))
            .map_err(js_error)
    }

    pub fn set_crop(&mut self, id: u32, x: f64, y: f64, width: f64, height: f64) -> Result<(), JsValue> {
        self.inner
            .set_crop(photo_id(id), Some(CropRect::new(x, y, width, height)))
            .map_err(js_error)
    }

    pub fn clear_crop(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.clear_crop(photo_id(id)).map_err(js_error)
    }

    /// Crop as `[x, y, width, height]` in oriented pixels, if any.
    pub fn crop(&self, id: u32) -> Option<Vec<f64>> {
        let crop = self.inner.photo(photo_id(id))?.crop?;
        Some(vec![crop.x, crop.y, crop.width, crop.height])
    }

    /// Apply an aspect preset by label ("free", "1:1", "4:3", ...).
    pub fn apply_aspect_preset(&mut self, id: u32, label: &str) -> Result<(), JsValue> {
        let preset = AspectPreset::from_label(label)
            .ok_or_else(|| js_error(format!("unknown aspect preset: {label}")))?;
        self.inner
            .apply_aspect_preset(photo_id(id), preset)
            .map_err(js_error)
    }

    /// Labels of every aspect preset, in menu order.
    pub fn aspect_presets() -> Vec<String> {
        AspectPreset::ALL.iter().map(|p| p.label().to_string()).collect()
    }

    // -- adjustments --

    pub fn set_adjustments(&mut self, id: u32, adjustments: &JsAdjustments, live: bool) -> Result<(), JsValue> {
        self.inner
            .set_adjustments(photo_id(id), adjustments.inner(), phase(live))
            .map_err(js_error)
    }

    pub fn adjustments(&self, id: u32) -> Option<JsAdjustments> {
        self.inner
            .photo(photo_id(id))
            .map(|p| JsAdjustments::from(p.adjustments))
    }

    pub fn reset_adjustments(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.reset_adjustments(photo_id(id)).map_err(js_error)
    }

    pub fn copy_adjustments(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.copy_adjustments(photo_id(id)).map(|_| ()).map_err(js_error)
    }

    /// Returns false when nothing has been copied yet.
    pub fn paste_adjustments(&mut self, id: u32) -> Result<bool, JsValue> {
        self.inner.paste_adjustments(photo_id(id)).map_err(js_error)
    }

    /// Copy one photo's adjustments to every photo as a single undo step.
    pub fn sync_adjustments(&mut self, from: u32, progress: Option<js_sys::Function>) -> Result<(), JsValue> {
        self.inner
            .sync_adjustments_to_all(photo_id(from), js_progress(progress))
            .map_err(js_error)
    }

    // -- whole collection --

    pub fn rotate_all(&mut self, clockwise: bool, progress: Option<js_sys::Function>) -> Result<(), JsValue> {
        self.inner.rotate_all(clockwise, js_progress(progress)).map_err(js_error)
    }

    /// Apply an aspect preset to every photo; "free" clears every crop.
    pub fn apply_aspect_preset_all(&mut self, label: &str, progress: Option<js_sys::Function>) -> Result<(), JsValue> {
        let preset = AspectPreset::from_label(label)
            .ok_or_else(|| js_error(format!("unknown aspect preset: {label}")))?;
        self.inner
            .apply_ratio_to_all(preset.ratio(), js_progress(progress))
            .map_err(js_error)
    }

    pub fn set_frame_all(&mut self, frame: &JsDecodedImage, progress: Option<js_sys::Function>) -> Result<(), JsValue> {
        let frame = frame.to_decoded().map_err(js_error)?;
        self.inner
            .set_frame_on_all(Some(frame), js_progress(progress))
            .map_err(js_error)
    }

    pub fn clear_frame_all(&mut self, progress: Option<js_sys::Function>) -> Result<(), JsValue> {
        self.inner.set_frame_on_all(None, js_progress(progress)).map_err(js_error)
    }

    // -- stepped batches --
    //
    // `begin_*` starts a batch; call `batch_step` once per animation frame
    // until it returns true. The finished batch is one undo step.

    pub fn begin_sync_adjustments(&mut self, from: u32) -> Result<(), JsValue> {
        self.inner.begin_sync_adjustments(photo_id(from)).map_err(js_error)
    }

    pub fn begin_rotate_all(&mut self, clockwise: bool) {
        self.inner.begin_batch_op(BatchOp::Rotate { clockwise });
    }

    pub fn begin_apply_aspect_preset_all(&mut self, label: &str) -> Result<(), JsValue> {
        let preset = AspectPreset::from_label(label)
            .ok_or_else(|| js_error(format!("unknown aspect preset: {label}")))?;
        self.inner.begin_apply_ratio_to_all(preset.ratio());
        Ok(())
    }

    pub fn begin_set_frame_all(&mut self, frame: &JsDecodedImage) -> Result<(), JsValue> {
        let frame = frame.to_decoded().map_err(js_error)?;
        self.inner.begin_set_frame_on_all(Some(frame)).map_err(js_error)
    }

    pub fn begin_reset_adjustments_all(&mut self) {
        self.inner.begin_batch_op(BatchOp::ResetAdjustments);
    }

    /// Process one chunk. Returns true once the batch has been committed.
    pub fn batch_step(&mut self) -> Result<bool, JsValue> {
        match self.inner.batch_step().map_err(js_error)? {
            BatchStep::Progress(_) => Ok(false),
            BatchStep::Done(_) => Ok(true),
        }
    }

    /// `[done, total]` of the running batch.
    #[wasm_bindgen(getter)]
    pub fn batch_progress(&self) -> Option<Vec<u32>> {
        self.inner
            .batch_progress()
            .map(|(done, total)| vec![done as u32, total as u32])
    }

    pub fn cancel_batch(&mut self) -> bool {
        self.inner.cancel_batch()
    }

    // -- overlays --

    pub fn set_frame(&mut self, id: u32, frame: &JsDecodedImage) -> Result<(), JsValue> {
        let frame = frame.to_decoded().map_err(js_error)?;
        self.inner.set_frame(photo_id(id), Some(frame)).map_err(js_error)
    }

    pub fn clear_frame(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.clear_frame(photo_id(id)).map_err(js_error)
    }

    /// Add a logo centered on the photo; returns the logo id.
    pub fn add_logo(&mut self, id: u32, image: &JsDecodedImage) -> Result<u32, JsValue> {
        let image = image.to_decoded().map_err(js_error)?;
        self.inner
            .add_logo(photo_id(id), image)
            .map(|logo| logo.get() as u32)
            .map_err(js_error)
    }

    pub fn remove_logo(&mut self, id: u32, logo: u32) -> Result<(), JsValue> {
        self.inner.remove_logo(photo_id(id), logo_id(logo)).map_err(js_error)
    }

    pub fn bring_logo_to_front(&mut self, id: u32, logo: u32) -> Result<(), JsValue> {
        self.inner
            .bring_logo_to_front(photo_id(id), logo_id(logo))
            .map_err(js_error)
    }

    pub fn select_logo(&mut self, id: u32, logo: Option<u32>) -> Result<(), JsValue> {
        self.inner
            .select_logo(photo_id(id), logo.map(logo_id))
            .map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn active_logo(&self) -> Option<u32> {
        self.inner.active_logo().map(|l| l.get() as u32)
    }

    /// Logo ids in paint order (last is on top).
    pub fn logo_ids(&self, id: u32) -> Vec<u32> {
        self.inner
            .photo(photo_id(id))
            .map(|p| p.logos.iter().map(|l| l.id.get() as u32).collect())
            .unwrap_or_default()
    }

    /// Move a logo by a viewport-normalized offset (arrow keys).
    pub fn nudge_logo(&mut self, id: u32, logo: u32, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.inner
            .nudge_logo(photo_id(id), logo_id(logo), dx, dy)
            .map_err(js_error)
    }

    // -- pointer --

    /// Switch to crop editing, optionally locked to `ratio` (width / height).
    pub fn set_crop_mode(&mut self, ratio: Option<f64>) {
        self.inner.set_mode(InteractionMode::Crop { ratio });
    }

    pub fn set_logo_mode(&mut self) {
        self.inner.set_mode(InteractionMode::Logo);
    }

    /// Feed a pointer event. The photo is drawn at `(origin_x, origin_y)`
    /// with `scale` screen pixels per image pixel.
    ///
    /// Returns "ignored", "started", "updated" or "finished".
    #[allow(clippy::too_many_arguments)]
    pub fn pointer(
        &mut self,
        id: u32,
        kind: &str,
        x: f64,
        y: f64,
        buttons_down: bool,
        origin_x: f64,
        origin_y: f64,
        scale: f64,
    ) -> Result<String, JsValue> {
        let kind = pointer_kind(kind).ok_or_else(|| js_error(format!("unknown pointer event: {kind}")))?;
        let id = photo_id(id);
        let mapping = self
            .inner
            .display_mapping(id, ScreenPoint::new(origin_x, origin_y), scale)
            .map_err(js_error)?;
        let mut event = PointerEvent::with_kind(kind, x, y);
        if kind == PointerKind::Move {
            event.buttons_down = buttons_down;
        }
        let outcome = self.inner.pointer(id, mapping, event).map_err(js_error)?;
        Ok(outcome_name(&outcome).to_string())
    }

    /// Snap guide positions as `[vertical, horizontal]`, NaN when unset.
    pub fn snap_guides(&self) -> Vec<f64> {
        let guides = self.inner.snap_guides();
        vec![
            guides.vertical.unwrap_or(f64::NAN),
            guides.horizontal.unwrap_or(f64::NAN),
        ]
    }

    // -- history --

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    // -- rendering --

    /// Render the photo to fit `max_width x max_height`, overlays included.
    pub fn preview(&mut self, id: u32, max_width: u32, max_height: u32) -> Result<JsDecodedImage, JsValue> {
        self.inner
            .preview(photo_id(id), max_width, max_height)
            .map(JsDecodedImage::from_decoded)
            .map_err(js_error)
    }

    pub fn thumbnail(&mut self, id: u32) -> Result<JsDecodedImage, JsValue> {
        self.inner
            .thumbnail(photo_id(id))
            .map(JsDecodedImage::from_decoded)
            .map_err(js_error)
    }

    /// Export one photo at full resolution. `options` is an optional plain
    /// object, e.g. `{ format: "png", resize: { mode: "width", width: 1200 } }`.
    pub fn export(&mut self, id: u32, options: JsValue) -> Result<Vec<u8>, JsValue> {
        let options = export_options(options)?;
        self.inner
            .export(photo_id(id), &options)
            .map(|out| out.bytes)
            .map_err(js_error)
    }

    /// Export every photo. Returns an array of `{ name, bytes }`.
    pub fn export_all(
        &mut self,
        options: JsValue,
        naming: JsValue,
        progress: Option<js_sys::Function>,
    ) -> Result<js_sys::Array, JsValue> {
        let options = export_options(options)?;
        let naming: NamingScheme = if naming.is_undefined() || naming.is_null() {
            NamingScheme::default()
        } else {
            serde_wasm_bindgen::from_value(naming).map_err(js_error)?
        };
        let files = self.export_files(&options, &naming, js_progress(progress))?;

        let out = js_sys::Array::new();
        for (name, bytes) in files {
            let entry = js_sys::Object::new();
            js_sys::Reflect::set(&entry, &"name".into(), &JsValue::from_str(&name))?;
            js_sys::Reflect::set(&entry, &"bytes".into(), &js_sys::Uint8Array::from(bytes.as_slice()))?;
            out.push(&entry);
        }
        Ok(out)
    }
}

impl JsEditor {
    pub(crate) fn with_config(config: EditorConfig) -> Self {
        debug!(?config, "editor session created");
        Self {
            inner: Editor::new(config),
        }
    }

    fn export_files(
        &mut self,
        options: &ExportOptions,
        naming: &NamingScheme,
        progress: impl FnMut(BatchProgress),
    ) -> Result<Vec<(String, Vec<u8>)>, JsValue> {
        let files = self.inner.export_all(options, naming, progress).map_err(js_error)?;
        Ok(files.into_iter().map(|f| (f.name, f.image.bytes)).collect())
    }
}

fn export_options(value: JsValue) -> Result<ExportOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ExportOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

fn outcome_name(outcome: &DragOutcome) -> &'static str {
    match outcome {
        DragOutcome::Ignored => "ignored",
        DragOutcome::Started => "started",
        DragOutcome::Updated(_) => "updated",
        DragOutcome::Finished => "finished",
    }
}
