//! Adjustment engine: `apply(source, adjustments) -> filtered`.
//!
//! The engine holds an optional preferred backend (the GPU one, supplied by
//! `framewright-gpu`) and the CPU loop. The first time the preferred
//! backend fails, the engine logs it, drops the backend and serves every
//! later call from the CPU. Callers never see a backend error.

use thiserror::Error;
use tracing::{debug, warn};

use crate::adjustments::apply_all_adjustments;
use crate::decode::DecodedImage;
use crate::Adjustments;

/// Error types for filter backends.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The backend could not run the filter (device lost, validation, ...).
    #[error("{backend} backend failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    /// Output dimensions differ from the source.
    #[error("backend returned {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Pixel buffer length does not match the stated dimensions.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// One implementation of the five-stage adjustment filter.
pub trait FilterBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Filter a full RGBA image. Alpha must pass through unchanged.
    fn apply(
        &self,
        source: &DecodedImage,
        adjustments: &Adjustments,
    ) -> Result<DecodedImage, EngineError>;
}

/// Per-pixel loop on the CPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl FilterBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn apply(
        &self,
        source: &DecodedImage,
        adjustments: &Adjustments,
    ) -> Result<DecodedImage, EngineError> {
        let expected = source.width as usize * source.height as usize * 4;
        if source.pixels.len() != expected {
            return Err(EngineError::BufferMismatch {
                expected,
                actual: source.pixels.len(),
            });
        }
        let mut out = source.clone();
        apply_all_adjustments(&mut out.pixels, adjustments);
        Ok(out)
    }
}

/// Dispatches filtering to the preferred backend with CPU fallback.
pub struct AdjustmentEngine {
    preferred: Option<Box<dyn FilterBackend>>,
    cpu: CpuBackend,
}

impl AdjustmentEngine {
    /// An engine that only ever uses the CPU.
    pub fn cpu() -> Self {
        Self {
            preferred: None,
            cpu: CpuBackend,
        }
    }

    /// An engine that tries `backend` first.
    pub fn with_backend(backend: Box<dyn FilterBackend>) -> Self {
        Self {
            preferred: Some(backend),
            cpu: CpuBackend,
        }
    }

    /// Name of the backend that will serve the next call.
    pub fn backend_name(&self) -> &'static str {
        match &self.preferred {
            Some(backend) => backend.name(),
            None => self.cpu.name(),
        }
    }

    pub fn is_accelerated(&self) -> bool {
        self.preferred.is_some()
    }

    /// Filter `source`. Deterministic; never fails.
    ///
    /// Identity adjustments and zero-area images return a copy of the source
    /// without dispatching to any backend.
    pub fn apply(&mut self, source: &DecodedImage, adjustments: &Adjustments) -> DecodedImage {
        let adjustments = adjustments.clamped();
        if adjustments.is_default() || source.is_empty() {
            return source.clone();
        }

        if let Some(backend) = &self.preferred {
            debug!(
                backend = backend.name(),
                width = source.width,
                height = source.height,
                "dispatching filter"
            );
            match backend.apply(source, &adjustments).and_then(|out| check_size(source, out)) {
                Ok(out) => return out,
                Err(e) => {
                    warn!(
                        backend = backend.name(),
                        error = %e,
                        "filter backend failed, falling back to CPU"
                    );
                    self.preferred = None;
                }
            }
        }

        match self.cpu.apply(source, &adjustments) {
            Ok(out) => out,
            Err(e) => {
                // malformed buffer: nothing sensible to filter
                warn!(error = %e, "CPU filter skipped");
                source.clone()
            }
        }
    }
}

impl Default for AdjustmentEngine {
    fn default() -> Self {
        Self::cpu()
    }
}

impl std::fmt::Debug for AdjustmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjustmentEngine")
            .field("backend", &self.backend_name())
            .finish()
    }
}

fn check_size(source: &DecodedImage, out: DecodedImage) -> Result<DecodedImage, EngineError> {
    if out.width != source.width || out.height != source.height {
        return Err(EngineError::SizeMismatch {
            width: source.width,
            height: source.height,
            actual_width: out.width,
            actual_height: out.height,
        });
    }
    Ok(out)
}
