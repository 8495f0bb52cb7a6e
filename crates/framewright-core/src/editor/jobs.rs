//! Whole-collection batches.
//!
//! A batch either runs to completion in one call ([`Editor::run_batch`],
//! [`Editor::apply_to_all`]) or is driven one chunk at a time: the host
//! calls [`Editor::begin_batch`] and then [`Editor::batch_step`] from its
//! event loop until it reports [`BatchStep::Done`]. Both paths commit the
//! result as one history step and commit nothing when a photo fails.

use std::fmt::{self, Display};

use tracing::{debug, warn};

use super::{non_empty, EditError, EditPhase, Editor};
use crate::batch::{self, BatchJob, BatchProgress, BatchRunner, BatchStep};
use crate::decode::DecodedImage;
use crate::interaction::InteractionMode;
use crate::model::{Collection, ImageHandle, Photo, PhotoId};
use crate::Adjustments;

type BoxedOp = Box<dyn FnMut(&Photo) -> Result<Photo, String> + Send>;

/// A stock operation applied to every photo.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    SyncAdjustments(Adjustments),
    ResetAdjustments,
    /// Quarter-turn; crops are dropped.
    Rotate { clockwise: bool },
    SetFrame(Option<ImageHandle>),
    /// Refit every crop to a width / height ratio.
    ApplyRatio(f64),
    ClearCrops,
}

impl BatchOp {
    fn into_op(self) -> BoxedOp {
        match self {
            BatchOp::SyncAdjustments(adjustments) => boxed(batch::sync_adjustments(adjustments)),
            BatchOp::ResetAdjustments => boxed(batch::reset_adjustments()),
            BatchOp::Rotate { clockwise } => boxed(batch::rotate_all(clockwise)),
            BatchOp::SetFrame(frame) => boxed(batch::set_frame_all(frame)),
            BatchOp::ApplyRatio(ratio) => boxed(batch::apply_ratio_all(Some(ratio))),
            BatchOp::ClearCrops => boxed(batch::apply_ratio_all(None)),
        }
    }
}

fn boxed<F, E>(mut op: F) -> BoxedOp
where
    F: FnMut(&Photo) -> Result<Photo, E> + Send + 'static,
    E: Display,
{
    Box::new(move |photo| op(photo).map_err(|e| e.to_string()))
}

fn frame_op(frame: Option<DecodedImage>) -> Result<BatchOp, EditError> {
    let frame = frame.map(|f| non_empty(f, "frame")).transpose()?;
    Ok(BatchOp::SetFrame(frame.map(ImageHandle::new)))
}

/// A batch started with [`Editor::begin_batch`].
pub(super) struct PendingBatch {
    /// The result only commits on top of this collection.
    origin: Collection,
    job: BatchJob<BoxedOp>,
}

impl fmt::Debug for PendingBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBatch")
            .field("done", &self.job.done())
            .field("total", &self.job.total())
            .finish()
    }
}

impl Editor {
    /// Run `op` over every photo in chunks and commit once.
    ///
    /// On failure nothing is recorded and the error is returned.
    pub fn run_batch<F, E>(
        &mut self,
        op: F,
        progress: impl FnMut(BatchProgress),
    ) -> Result<(), EditError>
    where
        F: FnMut(&Photo) -> Result<Photo, E>,
        E: Display,
    {
        self.cancel_live();
        let runner = BatchRunner::new(self.config.batch_chunk_size);
        let next = runner.run(self.collection(), op, progress)?;
        self.record(next, EditPhase::Commit);
        Ok(())
    }

    pub fn apply_to_all(
        &mut self,
        op: BatchOp,
        progress: impl FnMut(BatchProgress),
    ) -> Result<(), EditError> {
        self.run_batch(op.into_op(), progress)
    }

    /// Copy `from`'s adjustments onto every photo as one history step.
    pub fn sync_adjustments_to_all(
        &mut self,
        from: PhotoId,
        progress: impl FnMut(BatchProgress),
    ) -> Result<(), EditError> {
        let adjustments = self.copy_adjustments(from)?;
        self.apply_to_all(BatchOp::SyncAdjustments(adjustments), progress)
    }

    pub fn rotate_all(
        &mut self,
        clockwise: bool,
        progress: impl FnMut(BatchProgress),
    ) -> Result<(), EditError> {
        self.apply_to_all(BatchOp::Rotate { clockwise }, progress)
    }

    /// Put the same frame on every photo; `None` removes all frames.
    pub fn set_frame_on_all(
        &mut self,
        frame: Option<DecodedImage>,
        progress: impl FnMut(BatchProgress),
    ) -> Result<(), EditError> {
        let op = frame_op(frame)?;
        self.apply_to_all(op, progress)
    }

    /// Lock the crop ratio and refit every photo's crop to it. `None`
    /// unlocks the ratio and clears every crop.
    pub fn apply_ratio_to_all(
        &mut self,
        ratio: Option<f64>,
        progress: impl FnMut(BatchProgress),
    ) -> Result<(), EditError> {
        let op = self.lock_ratio(ratio);
        self.apply_to_all(op, progress)
    }

    fn lock_ratio(&mut self, ratio: Option<f64>) -> BatchOp {
        let ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
        self.set_mode(InteractionMode::Crop { ratio });
        match ratio {
            Some(r) => BatchOp::ApplyRatio(r),
            None => BatchOp::ClearCrops,
        }
    }

    // -- stepped --

    /// Start a batch over the current collection without running it.
    ///
    /// A batch already in progress is dropped.
    pub fn begin_batch<F, E>(&mut self, op: F)
    where
        F: FnMut(&Photo) -> Result<Photo, E> + Send + 'static,
        E: Display,
    {
        self.cancel_live();
        if let Some(old) = self.batch.take() {
            debug!(done = old.job.done(), total = old.job.total(), "batch replaced");
        }
        let origin = self.collection().clone();
        let job = BatchJob::new(origin.clone(), self.config.batch_chunk_size, boxed(op));
        self.batch = Some(PendingBatch { origin, job });
    }

    pub fn begin_batch_op(&mut self, op: BatchOp) {
        self.begin_batch(op.into_op());
    }

    /// Copy `from`'s adjustments and start syncing them to every photo.
    pub fn begin_sync_adjustments(&mut self, from: PhotoId) -> Result<(), EditError> {
        let adjustments = self.copy_adjustments(from)?;
        self.begin_batch_op(BatchOp::SyncAdjustments(adjustments));
        Ok(())
    }

    pub fn begin_set_frame_on_all(&mut self, frame: Option<DecodedImage>) -> Result<(), EditError> {
        let op = frame_op(frame)?;
        self.begin_batch_op(op);
        Ok(())
    }

    /// Stepped form of [`Editor::apply_ratio_to_all`]; the mode changes
    /// right away.
    pub fn begin_apply_ratio_to_all(&mut self, ratio: Option<f64>) {
        let op = self.lock_ratio(ratio);
        self.begin_batch_op(op);
    }

    /// Process the next chunk of the pending batch.
    ///
    /// [`BatchStep::Done`] carries the committed collection. A failing photo
    /// drops the batch and records nothing; so does any edit made to the
    /// collection while the batch was running.
    pub fn batch_step(&mut self) -> Result<BatchStep, EditError> {
        let pending = self.batch.as_mut().ok_or(EditError::NoBatch)?;
        let step = match pending.job.step() {
            Ok(step) => step,
            Err(e) => {
                self.batch = None;
                return Err(e.into());
            }
        };

        let next = match step {
            BatchStep::Done(next) => next,
            progress => return Ok(progress),
        };
        let Some(PendingBatch { origin, .. }) = self.batch.take() else {
            return Err(EditError::NoBatch);
        };
        if origin != *self.collection() {
            warn!(photos = origin.len(), "collection changed during batch, result dropped");
            return Err(EditError::BatchInterrupted);
        }
        self.cancel_live();
        self.record(next, EditPhase::Commit);
        Ok(BatchStep::Done(self.collection().clone()))
    }

    pub fn batch_pending(&self) -> bool {
        self.batch.is_some()
    }

    /// `(done, total)` of the pending batch.
    pub fn batch_progress(&self) -> Option<(usize, usize)> {
        self.batch.as_ref().map(|b| (b.job.done(), b.job.total()))
    }

    /// Drop the pending batch; `false` when there was none.
    pub fn cancel_batch(&mut self) -> bool {
        self.batch.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::editor_with;
    use super::*;
    use crate::batch::BatchError;
    use crate::model::{CropRect, Rotation};

    fn finish(editor: &mut Editor) -> Result<Vec<(usize, usize)>, EditError> {
        let mut seen = Vec::new();
        loop {
            match editor.batch_step()? {
                BatchStep::Progress(p) => seen.push((p.done, p.total)),
                BatchStep::Done(_) => return Ok(seen),
            }
        }
    }

    #[test]
    fn test_sync_adjustments_is_one_batch_step() {
        let (mut editor, ids) = editor_with(23, 4, 4);
        let adj = Adjustments {
            exposure: 30.0,
            vibrance: -10.0,
            ..Default::default()
        };
        editor.set_adjustments(ids[0], adj, EditPhase::Commit).unwrap();
        let before = editor.history_len();

        let mut chunks = Vec::new();
        editor
            .sync_adjustments_to_all(ids[0], |p| chunks.push(p.chunk_len))
            .unwrap();
        assert_eq!(chunks, vec![5, 5, 5, 5, 3]);
        assert_eq!(editor.history_len(), before + 1);
        assert!(editor.collection().iter().all(|p| p.adjustments == adj));
        assert_eq!(editor.copied_adjustments(), Some(adj));

        assert!(editor.undo());
        assert_eq!(editor.photo(ids[5]).unwrap().adjustments, Adjustments::default());
    }

    #[test]
    fn test_failed_batch_leaves_history_untouched() {
        let (mut editor, ids) = editor_with(10, 4, 4);
        let before = editor.collection().clone();
        let len = editor.history_len();
        let failing = ids[6];
        let result = editor.run_batch(
            |p: &Photo| {
                if p.id == failing {
                    Err("out of memory")
                } else {
                    Ok(p.with_straighten(3.0))
                }
            },
            |_| {},
        );
        assert!(matches!(
            result,
            Err(EditError::Batch(BatchError::PhotoFailed { index: 6, .. }))
        ));
        assert_eq!(editor.history_len(), len);
        assert_eq!(*editor.collection(), before);
    }

    #[test]
    fn test_stepped_batch_commits_once() {
        let (mut editor, ids) = editor_with(7, 4, 4);
        let adj = Adjustments {
            contrast: 25.0,
            ..Default::default()
        };
        editor.set_adjustments(ids[3], adj, EditPhase::Commit).unwrap();
        let len = editor.history_len();

        editor.begin_sync_adjustments(ids[3]).unwrap();
        assert!(editor.batch_pending());
        assert_eq!(editor.batch_progress(), Some((0, 7)));

        let first = editor.batch_step().unwrap();
        assert!(matches!(first, BatchStep::Progress(BatchProgress { done: 5, total: 7, .. })));
        // between steps the session keeps answering with the old state
        assert_eq!(editor.history_len(), len);
        assert_eq!(editor.photo(ids[0]).unwrap().adjustments, Adjustments::default());
        assert_eq!(editor.batch_progress(), Some((5, 7)));

        let second = editor.batch_step().unwrap();
        assert!(matches!(second, BatchStep::Progress(BatchProgress { done: 7, .. })));
        assert_eq!(editor.history_len(), len);

        let BatchStep::Done(result) = editor.batch_step().unwrap() else {
            panic!("batch did not finish");
        };
        assert_eq!(result, *editor.collection());
        assert!(!editor.batch_pending());
        assert_eq!(editor.history_len(), len + 1);
        assert!(editor.collection().iter().all(|p| p.adjustments == adj));

        assert!(editor.undo());
        assert_eq!(editor.photo(ids[0]).unwrap().adjustments, Adjustments::default());
        assert!(matches!(editor.batch_step(), Err(EditError::NoBatch)));
    }

    #[test]
    fn test_stepped_batch_failure_records_nothing() {
        let (mut editor, ids) = editor_with(8, 4, 4);
        let before = editor.collection().clone();
        let len = editor.history_len();
        let failing = ids[6];
        editor.begin_batch(move |p: &Photo| {
            if p.id == failing {
                Err("decoder gone")
            } else {
                Ok(p.with_straighten(2.0))
            }
        });

        assert!(matches!(editor.batch_step(), Ok(BatchStep::Progress(_))));
        assert!(matches!(
            editor.batch_step(),
            Err(EditError::Batch(BatchError::PhotoFailed { index: 6, .. }))
        ));
        assert!(!editor.batch_pending());
        assert_eq!(editor.history_len(), len);
        assert_eq!(*editor.collection(), before);
    }

    #[test]
    fn test_edit_between_steps_drops_batch_result() {
        let (mut editor, ids) = editor_with(6, 4, 4);
        editor.begin_batch_op(BatchOp::Rotate { clockwise: true });
        editor.batch_step().unwrap();
        editor.set_straighten(ids[0], 4.0, EditPhase::Commit).unwrap();
        let len = editor.history_len();

        assert!(matches!(finish(&mut editor), Err(EditError::BatchInterrupted)));
        assert!(!editor.batch_pending());
        assert_eq!(editor.history_len(), len);
        assert_eq!(editor.photo(ids[0]).unwrap().straighten, 4.0);
        assert!(editor.collection().iter().all(|p| p.rotation == Rotation::Deg0));
    }

    #[test]
    fn test_cancel_and_replace_batch() {
        let (mut editor, _) = editor_with(3, 4, 4);
        let len = editor.history_len();
        assert!(!editor.cancel_batch());

        editor.begin_batch_op(BatchOp::Rotate { clockwise: false });
        editor.batch_step().unwrap();
        editor.begin_batch_op(BatchOp::ResetAdjustments);
        assert_eq!(editor.batch_progress(), Some((0, 3)));
        assert!(editor.cancel_batch());
        assert!(!editor.batch_pending());
        assert_eq!(editor.history_len(), len);
    }

    #[test]
    fn test_stepped_batch_over_empty_collection() {
        let mut editor = Editor::default();
        let len = editor.history_len();
        editor.begin_batch_op(BatchOp::ResetAdjustments);
        assert!(matches!(editor.batch_step(), Ok(BatchStep::Done(_))));
        assert_eq!(editor.history_len(), len);
    }

    #[test]
    fn test_stepped_ratio_and_frame() {
        let (mut editor, ids) = editor_with(3, 300, 100);
        let len = editor.history_len();
        editor.begin_apply_ratio_to_all(Some(1.0));
        assert_eq!(editor.mode(), InteractionMode::Crop { ratio: Some(1.0) });
        assert_eq!(finish(&mut editor).unwrap(), vec![(3, 3)]);
        assert_eq!(
            editor.photo(ids[2]).unwrap().crop,
            Some(CropRect::new(100.0, 0.0, 100.0, 100.0))
        );

        assert!(matches!(
            editor.begin_set_frame_on_all(Some(DecodedImage::filled(0, 3, [0; 4]))),
            Err(EditError::EmptyImage { .. })
        ));
        assert!(!editor.batch_pending());
        editor
            .begin_set_frame_on_all(Some(DecodedImage::filled(30, 10, [9, 9, 9, 255])))
            .unwrap();
        finish(&mut editor).unwrap();
        assert!(editor.collection().iter().all(|p| p.frame.is_some()));
        assert_eq!(editor.history_len(), len + 2);
    }

    #[test]
    fn test_rotate_all_drops_crops() {
        let (mut editor, ids) = editor_with(4, 40, 20);
        editor.set_crop(ids[1], Some(CropRect::new(0.0, 0.0, 10.0, 10.0))).unwrap();
        let len = editor.history_len();
        let mut chunks = Vec::new();
        editor.rotate_all(true, |p| chunks.push(p.chunk_len)).unwrap();
        assert_eq!(chunks, vec![4]);
        assert_eq!(editor.history_len(), len + 1);
        assert!(editor.collection().iter().all(|p| p.rotation == Rotation::Deg90 && p.crop.is_none()));
    }

    #[test]
    fn test_frame_on_all_and_clear() {
        let (mut editor, ids) = editor_with(3, 40, 20);
        editor
            .set_frame_on_all(Some(DecodedImage::filled(40, 20, [0, 0, 0, 128])), |_| {})
            .unwrap();
        let frame = editor.photo(ids[0]).unwrap().frame.clone().unwrap();
        assert!(editor.collection().iter().all(|p| p.frame.as_ref() == Some(&frame)));
        // one shared allocation for the whole set
        assert!(frame.ref_count() > 3);

        assert!(matches!(
            editor.set_frame_on_all(Some(DecodedImage::filled(0, 0, [0; 4])), |_| {}),
            Err(EditError::EmptyImage { .. })
        ));
        editor.set_frame_on_all(None, |_| {}).unwrap();
        assert!(editor.collection().iter().all(|p| p.frame.is_none()));
    }

    #[test]
    fn test_ratio_to_all_locks_mode_and_fits_each_photo() {
        let (mut editor, ids) = editor_with(2, 400, 200);
        editor.rotate(ids[1], true).unwrap();
        editor.apply_ratio_to_all(Some(1.0), |_| {}).unwrap();
        assert_eq!(
            editor.mode(),
            InteractionMode::Crop { ratio: Some(1.0) }
        );
        assert_eq!(
            editor.photo(ids[0]).unwrap().crop,
            Some(CropRect::new(100.0, 0.0, 200.0, 200.0))
        );
        assert_eq!(
            editor.photo(ids[1]).unwrap().crop,
            Some(CropRect::new(0.0, 100.0, 200.0, 200.0))
        );

        let len = editor.history_len();
        editor.apply_ratio_to_all(None, |_| {}).unwrap();
        assert_eq!(editor.mode(), InteractionMode::Crop { ratio: None });
        assert!(editor.collection().iter().all(|p| p.crop.is_none()));
        assert_eq!(editor.history_len(), len + 1);
    }
}
