//! Framewright GPU - wgpu backend for the adjustment engine
//!
//! [`GpuBackend`] runs the five-stage adjustment formula as a WGSL fragment
//! shader. It plugs into [`framewright_core::AdjustmentEngine`], which
//! falls back to the CPU loop whenever this backend fails.

mod context;
mod pipeline;
mod texture;

use thiserror::Error;
use tracing::warn;

use framewright_core::decode::DecodedImage;
use framewright_core::formula::FilterCoefficients;
use framewright_core::{Adjustments, AdjustmentEngine, EngineError, FilterBackend};

pub use context::GpuContext;
pub use pipeline::AdjustPipeline;
pub use texture::GpuTexture;

/// Error types for the GPU backend.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found: {0}")]
    NoAdapter(String),

    #[error("failed to create GPU device: {0}")]
    DeviceRequest(String),

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("GPU execution failed: {0}")]
    Execution(String),

    #[error("GPU poll error: {0}")]
    Poll(String),

    #[error("texture readback failed: {0}")]
    Readback(String),

    #[error("image {width}x{height} exceeds the device limit of {max} pixels per side")]
    TooLarge { width: u32, height: u32, max: u32 },
}

impl From<GpuError> for EngineError {
    fn from(e: GpuError) -> Self {
        EngineError::Backend {
            backend: "gpu",
            message: e.to_string(),
        }
    }
}

/// Adjustment filter on the GPU.
pub struct GpuBackend {
    ctx: GpuContext,
    pipeline: AdjustPipeline,
}

impl GpuBackend {
    /// Create the device and compile the shader (blocking).
    pub fn new() -> Result<Self, GpuError> {
        let ctx = GpuContext::new_blocking()?;
        let pipeline = AdjustPipeline::new(&ctx)?;
        Ok(Self { ctx, pipeline })
    }

    pub fn adapter_name(&self) -> &str {
        &self.ctx.adapter_info.name
    }

    /// Filter an image, surfacing GPU errors.
    pub fn filter(
        &self,
        source: &DecodedImage,
        adjustments: &Adjustments,
    ) -> Result<DecodedImage, GpuError> {
        let max = self.ctx.max_texture_side();
        if source.width > max || source.height > max {
            return Err(GpuError::TooLarge {
                width: source.width,
                height: source.height,
                max,
            });
        }

        let coeffs = FilterCoefficients::from_adjustments(adjustments);
        let input = GpuTexture::upload(&self.ctx, source, "adjust_in");
        let output = self.pipeline.run(&self.ctx, &input, &coeffs)?;
        output.download(&self.ctx)
    }
}

impl FilterBackend for GpuBackend {
    fn name(&self) -> &'static str {
        "gpu"
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
        Ok(self.filter(source, adjustments)?)
    }
}

/// An engine that prefers the GPU, or a CPU-only one when no device can be
/// created.
pub fn preferred_engine() -> AdjustmentEngine {
    match GpuBackend::new() {
        Ok(backend) => AdjustmentEngine::with_backend(Box::new(backend)),
        Err(e) => {
            warn!(error = %e, "GPU unavailable, filtering on the CPU");
            AdjustmentEngine::cpu()
        }
    }
}
