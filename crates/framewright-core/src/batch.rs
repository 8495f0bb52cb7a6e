//! Apply one operation to every photo, in chunks.
//!
//! A [`BatchJob`] processes one chunk per [`BatchJob::step`]; the gap
//! between steps is where a host yields to its event loop.
//! [`BatchRunner::run`] drives a job to completion and reports progress
//! after each chunk.
//!
//! A batch is all-or-nothing: the first per-photo failure aborts it and
//! the caller gets the error instead of a collection, so nothing is
//! committed to history.

use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::model::{Collection, ImageHandle, Photo, PhotoId};
use crate::transform::{apply_aspect_ratio, effective_dimensions};
use crate::Adjustments;

/// Default number of photos per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 5;

#[derive(Debug, Error)]
pub enum BatchError {
    /// The operation failed on one photo; the batch was not applied.
    #[error("batch failed on photo {index} ({name}): {message}")]
    PhotoFailed {
        index: usize,
        photo: PhotoId,
        name: String,
        message: String,
    },
}

/// Progress after a finished chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Photos processed so far.
    pub done: usize,
    pub total: usize,
    /// Size of the chunk that just finished.
    pub chunk_len: usize,
}

/// Result of one [`BatchJob::step`].
#[derive(Debug)]
pub enum BatchStep {
    Progress(BatchProgress),
    Done(Collection),
}

/// An in-flight batch over a snapshot of the collection.
pub struct BatchJob<F> {
    source: Collection,
    results: Vec<Arc<Photo>>,
    chunk_size: usize,
    op: F,
}

impl<F, E> BatchJob<F>
where
    F: FnMut(&Photo) -> Result<Photo, E>,
    E: Display,
{
    pub fn new(source: Collection, chunk_size: usize, op: F) -> Self {
        Self {
            results: Vec::with_capacity(source.len()),
            source,
            chunk_size: chunk_size.max(1),
            op,
        }
    }

    pub fn done(&self) -> usize {
        self.results.len()
    }

    pub fn total(&self) -> usize {
        self.source.len()
    }

    /// Process the next chunk, or hand back the finished collection.
    pub fn step(&mut self) -> Result<BatchStep, BatchError> {
        let start = self.results.len();
        let total = self.source.len();
        if start >= total {
            return Ok(BatchStep::Done(Collection::from_arcs(std::mem::take(
                &mut self.results,
            ))));
        }

        let end = (start + self.chunk_size).min(total);
        for index in start..end {
            let Some(original) = self.source.arc_at(index) else {
                break;
            };
            let next = (self.op)(original).map_err(|e| BatchError::PhotoFailed {
                index,
                photo: original.id,
                name: original.name.clone(),
                message: e.to_string(),
            })?;
            // unchanged photos keep sharing their allocation
            if next == **original {
                self.results.push(Arc::clone(original));
            } else {
                self.results.push(Arc::new(next));
            }
        }

        let progress = BatchProgress {
            done: end,
            total,
            chunk_len: end - start,
        };
        debug!(done = progress.done, total, chunk = progress.chunk_len, "batch chunk finished");
        Ok(BatchStep::Progress(progress))
    }
}

/// Runs batch jobs with a fixed chunk size.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    chunk_size: usize,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl BatchRunner {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunk lengths for `total` photos, e.g. 23 -> [5, 5, 5, 5, 3].
    pub fn chunk_sizes(&self, total: usize) -> Vec<usize> {
        (0..total)
            .step_by(self.chunk_size)
            .map(|start| (total - start).min(self.chunk_size))
            .collect()
    }

    pub fn job<F, E>(&self, collection: &Collection, op: F) -> BatchJob<F>
    where
        F: FnMut(&Photo) -> Result<Photo, E>,
        E: Display,
    {
        BatchJob::new(collection.clone(), self.chunk_size, op)
    }

    /// Run `op` over every photo, calling `progress` between chunks.
    pub fn run<F, E, P>(
        &self,
        collection: &Collection,
        op: F,
        mut progress: P,
    ) -> Result<Collection, BatchError>
    where
        F: FnMut(&Photo) -> Result<Photo, E>,
        E: Display,
        P: FnMut(BatchProgress),
    {
        let mut job = self.job(collection, op);
        loop {
            match job.step()? {
                BatchStep::Progress(p) => progress(p),
                BatchStep::Done(result) => return Ok(result),
            }
        }
    }
}

/// Set the same adjustments on every photo.
pub fn sync_adjustments(
    adjustments: Adjustments,
) -> impl FnMut(&Photo) -> Result<Photo, Infallible> {
    move |photo| Ok(photo.with_adjustments(adjustments))
}

pub fn reset_adjustments() -> impl FnMut(&Photo) -> Result<Photo, Infallible> {
    sync_adjustments(Adjustments::default())
}

/// Quarter-turn every photo; each loses its crop.
pub fn rotate_all(clockwise: bool) -> impl FnMut(&Photo) -> Result<Photo, Infallible> {
    move |photo| {
        let rotation = if clockwise {
            photo.rotation.clockwise()
        } else {
            photo.rotation.counter_clockwise()
        };
        Ok(photo.with_rotation(rotation))
    }
}

pub fn set_frame_all(frame: Option<ImageHandle>) -> impl FnMut(&Photo) -> Result<Photo, Infallible> {
    move |photo| Ok(photo.with_frame(frame.clone()))
}

/// Apply an aspect ratio to every photo's crop; `None` clears the crops.
pub fn apply_ratio_all(ratio: Option<f64>) -> impl FnMut(&Photo) -> Result<Photo, Infallible> {
    move |photo| {
        let crop = ratio.map(|r| {
            let (w, h) = effective_dimensions(photo);
            apply_aspect_ratio(photo.crop, r, w as f64, h as f64)
        });
        Ok(photo.with_crop(crop))
    }
}
