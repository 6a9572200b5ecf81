use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::config::OutputFormat;
use crate::consts::{FALLBACK_FILE_STEM, MAX_NORMALIZED_QUALITY, MIN_NORMALIZED_QUALITY};
use crate::error::{CropError, Result};

/// The encoded crop, handed to whatever uploads it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportResult {
    pub blob: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// Map a 0-100 quality onto the normalized 0.1-1.0 range.
pub fn normalize_quality(quality: u8) -> f32 {
    (quality as f32 / 100.0).clamp(MIN_NORMALIZED_QUALITY, MAX_NORMALIZED_QUALITY)
}

/// Encode the rendered surface.
///
/// JPEG has no alpha channel, so transparent pixels are composited over
/// `background` first. PNG is lossless and ignores `quality`.
pub fn encode(
    surface: &RgbaImage,
    format: OutputFormat,
    quality: u8,
    background: [u8; 3],
) -> Result<Vec<u8>> {
    let mut blob = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let jpeg_quality = (normalize_quality(quality) * 100.0).round() as u8;
            let flat = flatten(surface, background);
            let encoder = JpegEncoder::new_with_quality(&mut blob, jpeg_quality);
            flat.write_with_encoder(encoder)
                .map_err(|e| CropError::EncodingFailed(format!("JPEG encoding failed: {e}")))?;
        }
        OutputFormat::Png => {
            surface
                .write_to(&mut Cursor::new(&mut blob), ImageFormat::Png)
                .map_err(|e| CropError::EncodingFailed(format!("PNG encoding failed: {e}")))?;
        }
    }
    Ok(blob)
}

/// Composite RGBA over an opaque background colour.
fn flatten(surface: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let [r, g, b, a] = surface.get_pixel(x, y).0;
        let alpha = a as u16;
        let blend = |fg: u8, bg: u8| -> u8 {
            ((fg as u16 * alpha + bg as u16 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

/// Base name of `original` with its extension replaced by the format's.
///
/// Directory components are dropped; only the last extension is removed, so
/// a bare dot-file such as `.png` has an empty stem.
pub fn export_filename(original: &str, format: OutputFormat) -> String {
    // Accept both separators; names may come from any platform.
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem).trim();
    let stem = if stem.is_empty() { FALLBACK_FILE_STEM } else { stem };
    format!("{stem}.{}", format.extension())
}
