//! Geometry rendering by inverse mapping.
//!
//! For each output pixel the inverse render transform gives the source
//! position to sample. Pixel centers sit at `+0.5`, so an identity
//! transform samples exactly on source pixel centers and copies the image.
//! Positions outside the source come out fully transparent.

use kurbo::Affine;

use super::resolver::{render_transform, RenderTransform};
use crate::decode::{DecodedImage, FilterType};
use crate::model::Photo;

/// Resample the photo's stored pixels through its render transform.
///
/// `stored` is the buffer being sampled (source or thumbnail); `scale` is
/// output pixels per oriented pixel.
pub fn render_geometry(
    photo: &Photo,
    stored: &DecodedImage,
    scale: f64,
    filter: FilterType,
) -> DecodedImage {
    let transform = render_transform(photo, (stored.width, stored.height), scale);
    warp(stored, &transform, filter)
}

/// Resample `image` into the transform's output canvas.
pub fn warp(image: &DecodedImage, transform: &RenderTransform, filter: FilterType) -> DecodedImage {
    if image.is_empty() {
        return DecodedImage::transparent(transform.width, transform.height);
    }

    if let Some((dx, dy)) = integer_translation(&transform.affine) {
        return copy_translated(image, transform.width, transform.height, dx, dy);
    }

    let inverse = transform.inverse();
    let (dst_w, dst_h) = (transform.width, transform.height);
    let mut output = vec![0u8; dst_w as usize * dst_h as usize * 4];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let center = kurbo::Point::new(dst_x as f64 + 0.5, dst_y as f64 + 0.5);
            let src = inverse * center;
            // back to index space, where pixel (i, j) sits at (i, j)
            let (sx, sy) = (src.x - 0.5, src.y - 0.5);

            let pixel = sample(image, sx, sy, filter);

            let idx = (dst_y as usize * dst_w as usize + dst_x as usize) * 4;
            output[idx..idx + 4].copy_from_slice(&pixel);
        }
    }

    DecodedImage::new(dst_w, dst_h, output)
}

/// Sample `image` at index-space position `(x, y)`; transparent outside.
pub(crate) fn sample(image: &DecodedImage, x: f64, y: f64, filter: FilterType) -> [u8; 4] {
    match filter {
        FilterType::Nearest => sample_nearest(image, x, y),
        FilterType::Bilinear => sample_bilinear(image, x, y),
        FilterType::Lanczos3 => sample_lanczos3(image, x, y),
    }
}

/// `Some((dx, dy))` when the affine is a pure whole-pixel translation.
fn integer_translation(affine: &Affine) -> Option<(i64, i64)> {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let eps = 1e-9;
    let whole = |v: f64| (v - v.round()).abs() < eps;
    if (a - 1.0).abs() < eps && b.abs() < eps && c.abs() < eps && (d - 1.0).abs() < eps
        && whole(e)
        && whole(f)
    {
        Some((e.round() as i64, f.round() as i64))
    } else {
        None
    }
}

/// Output pixel (x, y) takes source pixel (x - dx, y - dy).
fn copy_translated(image: &DecodedImage, width: u32, height: u32, dx: i64, dy: i64) -> DecodedImage {
    let mut out = DecodedImage::transparent(width, height);
    let (sw, sh) = (image.width as i64, image.height as i64);

    for y in 0..height as i64 {
        let sy = y - dy;
        if sy < 0 || sy >= sh {
            continue;
        }
        let x_start = dx.max(0);
        let x_end = (sw + dx).min(width as i64);
        if x_start >= x_end {
            continue;
        }
        let len = (x_end - x_start) as usize * 4;
        let src = ((sy * sw + (x_start - dx)) * 4) as usize;
        let dst = ((y * width as i64 + x_start) * 4) as usize;
        out.pixels[dst..dst + len].copy_from_slice(&image.pixels[src..src + len]);
    }

    out
}

/// Inside the area covered by source pixels (half a pixel past the
/// outermost centers).
#[inline]
fn in_bounds(image: &DecodedImage, x: f64, y: f64) -> bool {
    x >= -0.5 && y >= -0.5 && x < image.width as f64 - 0.5 && y < image.height as f64 - 0.5
}

#[inline]
fn get_pixel_f64(image: &DecodedImage, px: i64, py: i64) -> [f64; 4] {
    let px = px.clamp(0, image.width as i64 - 1) as usize;
    let py = py.clamp(0, image.height as i64 - 1) as usize;
    let idx = (py * image.width as usize + px) * 4;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
        image.pixels[idx + 3] as f64,
    ]
}

fn sample_nearest(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    if !in_bounds(image, x, y) {
        return [0, 0, 0, 0];
    }
    let p = get_pixel_f64(image, x.round() as i64, y.round() as i64);
    [p[0] as u8, p[1] as u8, p[2] as u8, p[3] as u8]
}

/// Bilinear interpolation over the 4 nearest pixels, edges clamped.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    if !in_bounds(image, x, y) {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x0 + 1, y0);
    let p01 = get_pixel_f64(image, x0, y0 + 1);
    let p11 = get_pixel_f64(image, x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

/// Lanczos3 over a 6x6 neighborhood; falls back to bilinear near edges.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    if !in_bounds(image, x, y) {
        return [0, 0, 0, 0];
    }
    let (w, h) = (image.width as f64, image.height as f64);
    if x < 2.0 || x >= w - 3.0 || y < 2.0 || y >= h - 3.0 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            let pixel = get_pixel_f64(image, px, py);
            for i in 0..4 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    let mut result = [0u8; 4];
    if weight_sum > 0.0 {
        for i in 0..4 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }
    result
}

/// `L(x) = sinc(x) * sinc(x / a)` for `|x| < a`, else 0.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }
    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
