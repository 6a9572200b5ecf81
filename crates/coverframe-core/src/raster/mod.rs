mod cpu;

pub use cpu::CpuRasterizer;

use image::RgbaImage;

use crate::error::Result;
use crate::geometry::{CropBoxGeometry, SourceRect, TargetSize};
use crate::viewport::ViewportState;

/// Capability to draw a region of a source bitmap into a fixed-size surface.
pub trait RasterBackend {
    fn name(&self) -> &str;

    /// Resample `src` (natural source pixels) of `source` into a new
    /// `dst.width x dst.height` surface.
    fn draw_region(&self, source: &RgbaImage, src: SourceRect, dst: TargetSize)
        -> Result<RgbaImage>;
}

/// Source-pixel rectangle visible through the crop box.
///
/// Converts the display-space crop box back into natural source pixels:
/// the scaled image is centred on the box, shifted by `offset`, then
/// divided by the effective scale `cover_scale * zoom`.
pub fn source_rect(
    state: &ViewportState,
    natural: (f64, f64),
    cover_scale: f64,
    crop_box: CropBoxGeometry,
) -> SourceRect {
    let (natural_w, natural_h) = natural;
    let scale = cover_scale * state.zoom;
    let scaled_w = natural_w * scale;
    let scaled_h = natural_h * scale;

    let left_in_scaled = (scaled_w - crop_box.width) / 2.0 - state.offset.x;
    let top_in_scaled = (scaled_h - crop_box.height) / 2.0 - state.offset.y;

    SourceRect {
        x: left_in_scaled / scale,
        y: top_in_scaled / scale,
        width: crop_box.width / scale,
        height: crop_box.height / scale,
    }
}
