use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::consts::{MAX_SUPERSAMPLE, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{CropError, Result};
use crate::geometry::{SourceRect, TargetSize};

use super::RasterBackend;

/// CPU backend: bilinear sampling with supersampling on downscale,
/// using Rayon for row parallelism on large targets.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRasterizer;

impl RasterBackend for CpuRasterizer {
    fn name(&self) -> &str {
        "CPU/Rayon"
    }

    fn draw_region(
        &self,
        source: &RgbaImage,
        src: SourceRect,
        dst: TargetSize,
    ) -> Result<RgbaImage> {
        if dst.width == 0 || dst.height == 0 {
            return Err(CropError::EncodingFailed(format!(
                "target surface is empty: {}x{}",
                dst.width, dst.height
            )));
        }
        if !src.is_finite() || src.width <= 0.0 || src.height <= 0.0 {
            return Err(CropError::EncodingFailed(format!(
                "invalid source region: {src:?}"
            )));
        }
        if source.width() == 0 || source.height() == 0 {
            return Err(CropError::EncodingFailed("source bitmap is empty".into()));
        }

        let sampler = Sampler::new(source, src, dst);
        debug!(
            taps_x = sampler.taps_x,
            taps_y = sampler.taps_y,
            width = dst.width,
            height = dst.height,
            "Rasterizing crop"
        );

        let row_len = dst.width as usize * 4;
        let mut buf = vec![0u8; dst.pixel_count() * 4];

        if dst.pixel_count() >= PARALLEL_PIXEL_THRESHOLD {
            buf.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(row, out)| sampler.render_row(row as u32, out));
        } else {
            buf.chunks_mut(row_len)
                .enumerate()
                .for_each(|(row, out)| sampler.render_row(row as u32, out));
        }

        RgbaImage::from_raw(dst.width, dst.height, buf).ok_or_else(|| {
            CropError::EncodingFailed("output buffer does not match target size".into())
        })
    }
}

struct Sampler<'a> {
    source: &'a RgbaImage,
    src: SourceRect,
    dst: TargetSize,
    /// Source pixels per output pixel.
    step_x: f64,
    step_y: f64,
    taps_x: u32,
    taps_y: u32,
}

impl<'a> Sampler<'a> {
    fn new(source: &'a RgbaImage, src: SourceRect, dst: TargetSize) -> Self {
        let step_x = src.width / dst.width as f64;
        let step_y = src.height / dst.height as f64;
        Self {
            source,
            src,
            dst,
            step_x,
            step_y,
            taps_x: taps_for(step_x),
            taps_y: taps_for(step_y),
        }
    }

    fn render_row(&self, row: u32, out: &mut [u8]) {
        let taps = (self.taps_x * self.taps_y) as f32;

        for col in 0..self.dst.width {
            let mut acc = [0.0f32; 4];

            for ty in 0..self.taps_y {
                let fy = (ty as f64 + 0.5) / self.taps_y as f64;
                // Pixel centres sit at integer + 0.5 in source space.
                let sy = self.src.y + (row as f64 + fy) * self.step_y - 0.5;
                for tx in 0..self.taps_x {
                    let fx = (tx as f64 + 0.5) / self.taps_x as f64;
                    let sx = self.src.x + (col as f64 + fx) * self.step_x - 0.5;
                    let px = self.bilinear_premultiplied(sx, sy);
                    for (a, p) in acc.iter_mut().zip(px) {
                        *a += p;
                    }
                }
            }

            let alpha = acc[3] / taps;
            let idx = col as usize * 4;
            if alpha > 0.0 {
                for c in 0..3 {
                    out[idx + c] = to_u8(acc[c] / taps / alpha * 255.0);
                }
            }
            out[idx + 3] = to_u8(alpha * 255.0);
        }
    }

    /// Bilinear sample at (x, y) with edge clamping. Returns premultiplied
    /// RGB plus alpha, all in [0, 1].
    fn bilinear_premultiplied(&self, x: f64, y: f64) -> [f32; 4] {
        let max_x = self.source.width() as i64 - 1;
        let max_y = self.source.height() as i64 - 1;

        let x0f = x.floor();
        let y0f = y.floor();
        let fx = (x - x0f) as f32;
        let fy = (y - y0f) as f32;

        let x0 = (x0f as i64).clamp(0, max_x) as u32;
        let x1 = (x0f as i64 + 1).clamp(0, max_x) as u32;
        let y0 = (y0f as i64).clamp(0, max_y) as u32;
        let y1 = (y0f as i64 + 1).clamp(0, max_y) as u32;

        let p00 = premultiplied(self.source, x0, y0);
        let p10 = premultiplied(self.source, x1, y0);
        let p01 = premultiplied(self.source, x0, y1);
        let p11 = premultiplied(self.source, x1, y1);

        let mut out = [0.0f32; 4];
        for c in 0..4 {
            out[c] = p00[c] * (1.0 - fx) * (1.0 - fy)
                + p10[c] * fx * (1.0 - fy)
                + p01[c] * (1.0 - fx) * fy
                + p11[c] * fx * fy;
        }
        out
    }
}

fn premultiplied(img: &RgbaImage, x: u32, y: u32) -> [f32; 4] {
    let [r, g, b, a] = img.get_pixel(x, y).0;
    let a = a as f32 / 255.0;
    [
        r as f32 / 255.0 * a,
        g as f32 / 255.0 * a,
        b as f32 / 255.0 * a,
        a,
    ]
}

/// Taps per axis: one per source pixel covered, capped.
fn taps_for(step: f64) -> u32 {
    (step.ceil() as u32).clamp(1, MAX_SUPERSAMPLE)
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
