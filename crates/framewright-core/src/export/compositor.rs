//! Flattening a photo's recipe into pixels.
//!
//! Preview, thumbnails and export share [`compose`]: the geometry pass
//! resamples into the viewport canvas, then the frame and the logos are
//! drawn straight onto that canvas. Only the output scale differs.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::decode::{resize, DecodeError, DecodedImage, FilterType};
use crate::encode::{encode, EncodeError, ExportFormat};
use crate::engine::AdjustmentEngine;
use crate::model::{CropRect, LogoLayer, Photo};
use crate::transform::{render_geometry, sample};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("resize failed: {0}")]
    Resize(#[from] DecodeError),

    /// Every photo needs pixels to export.
    #[error("photo {name} has no pixels")]
    EmptyImage { name: String },
}

/// Output size requested for an export.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ResizeSpec {
    /// Keep the rendered size.
    #[default]
    Original,
    /// Fixed width, height follows the aspect.
    Width { width: u32 },
    /// Fixed height, width follows the aspect.
    Height { height: u32 },
    /// Percentage of the rendered size.
    Percent { percent: f64 },
    /// Both sides given; aspect is not preserved.
    Exact { width: u32, height: u32 },
}

impl ResizeSpec {
    /// Target size for a `width` x `height` render, each side at least 1.
    pub fn target(self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = (width as f64, height as f64);
        let (tw, th) = match self {
            ResizeSpec::Original => (w, h),
            ResizeSpec::Width { width: tw } => (tw as f64, h * tw as f64 / w.max(1.0)),
            ResizeSpec::Height { height: th } => (w * th as f64 / h.max(1.0), th as f64),
            ResizeSpec::Percent { percent } => {
                let p = if percent.is_finite() && percent > 0.0 {
                    percent / 100.0
                } else {
                    1.0
                };
                (w * p, h * p)
            }
            ResizeSpec::Exact { width, height } => (width as f64, height as f64),
        };
        (tw.round().max(1.0) as u32, th.round().max(1.0) as u32)
    }
}

/// Everything export needs besides the photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// 0..1, only used by lossy formats.
    pub quality: f32,
    pub resize: ResizeSpec,
    pub filter: FilterType,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 0.92,
            resize: ResizeSpec::Original,
            filter: FilterType::Lanczos3,
        }
    }
}

/// An encoded export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
}

/// Geometry of `stored` at `scale`, with the frame and logos on top when
/// `overlays` is set.
///
/// `stored` may be the source, the thumbnail or an already filtered copy
/// of either; the render transform scales it to natural size first.
pub fn compose(
    photo: &Photo,
    stored: &DecodedImage,
    scale: f64,
    filter: FilterType,
    overlays: bool,
) -> DecodedImage {
    let mut canvas = render_geometry(photo, stored, scale, filter);
    if overlays {
        draw_overlays(&mut canvas, photo, filter);
    }
    canvas
}

/// Paint the frame, then each logo in order, onto a viewport canvas.
pub fn draw_overlays(canvas: &mut DecodedImage, photo: &Photo, filter: FilterType) {
    if canvas.is_empty() {
        return;
    }
    if let Some(frame) = &photo.frame {
        draw_frame(canvas, frame.image(), filter);
    }
    for logo in &photo.logos {
        draw_logo(canvas, logo, filter);
    }
}

/// Stretch the frame over the whole canvas.
fn draw_frame(canvas: &mut DecodedImage, frame: &DecodedImage, filter: FilterType) {
    if frame.is_empty() {
        return;
    }
    let Ok(stretched) = resize(frame, canvas.width, canvas.height, filter) else {
        return;
    };
    for (dst, src) in canvas
        .pixels
        .chunks_exact_mut(4)
        .zip(stretched.pixels.chunks_exact(4))
    {
        blend_over(dst, [src[0], src[1], src[2], src[3]]);
    }
}

/// Draw one logo, sized against the canvas's shorter side.
fn draw_logo(canvas: &mut DecodedImage, logo: &LogoLayer, filter: FilterType) {
    let image = logo.image.image();
    if image.is_empty() {
        return;
    }
    let viewport = CropRect::new(0.0, 0.0, canvas.width as f64, canvas.height as f64);
    let short = viewport.width.min(viewport.height);
    let width = logo.scale * short;
    let height = width * logo.aspect();
    if width <= 0.0 || height <= 0.0 {
        return;
    }

    // logo pixel space -> canvas space
    let to_canvas = Affine::translate(Vec2::new(
        logo.x * viewport.width,
        logo.y * viewport.height,
    )) * Affine::rotate(logo.rotation)
        * Affine::scale_non_uniform(width / image.width as f64, height / image.height as f64)
        * Affine::translate(Vec2::new(
            -(image.width as f64) / 2.0,
            -(image.height as f64) / 2.0,
        ));
    let to_logo = to_canvas.inverse();

    let bounds = to_canvas.transform_rect_bbox(kurbo::Rect::new(
        0.0,
        0.0,
        image.width as f64,
        image.height as f64,
    ));
    let x0 = bounds.x0.floor().max(0.0) as u32;
    let y0 = bounds.y0.floor().max(0.0) as u32;
    let x1 = (bounds.x1.ceil().max(0.0) as u32).min(canvas.width);
    let y1 = (bounds.y1.ceil().max(0.0) as u32).min(canvas.height);

    for y in y0..y1 {
        for x in x0..x1 {
            let p = to_logo * Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let src = sample(image, p.x - 0.5, p.y - 0.5, filter);
            if src[3] == 0 {
                continue;
            }
            let idx = (y as usize * canvas.width as usize + x as usize) * 4;
            blend_over(&mut canvas.pixels[idx..idx + 4], src);
        }
    }
}

/// Straight-alpha source-over.
fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        dst.copy_from_slice(&src);
        return;
    }
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Render `photo` at full source resolution and encode it.
///
/// Geometry runs first so the filter only touches pixels that survive the
/// crop; per-pixel filtering commutes with resampling up to rounding.
pub fn export_photo(
    photo: &Photo,
    engine: &mut AdjustmentEngine,
    options: &ExportOptions,
) -> Result<ExportedImage, ExportError> {
    let source = photo.source.image();
    if source.is_empty() {
        return Err(ExportError::EmptyImage {
            name: photo.name.clone(),
        });
    }

    let geometry = render_geometry(photo, source, 1.0, options.filter);
    let mut canvas = engine.apply(&geometry, &photo.adjustments);
    draw_overlays(&mut canvas, photo, options.filter);

    let (width, height) = options.resize.target(canvas.width, canvas.height);
    let output = resize(&canvas, width, height, options.filter)?;
    let bytes = encode(&output, options.format, options.quality)?;

    info!(
        photo = photo.id.get(),
        width,
        height,
        format = options.format.extension(),
        bytes = bytes.len(),
        "export finished"
    );

    Ok(ExportedImage {
        bytes,
        width,
        height,
        format: options.format,
    })
}
