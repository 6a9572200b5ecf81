#![allow(dead_code)]

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use coverframe_core::io::loader::FileHandle;

/// Horizontal red ramp with a vertical green ramp.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8;
        let g = (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8;
        Rgba([r, g, 64, 255])
    })
}

/// Four solid quadrants: red, green / blue, white.
pub fn quadrants(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        match (x < width / 2, y < height / 2) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 255, 255]),
        }
    })
}

pub fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            image::DynamicImage::ImageRgba8(img.clone())
                .to_rgb8()
                .write_to(&mut Cursor::new(&mut buf), format)
                .unwrap();
        }
        _ => img.write_to(&mut Cursor::new(&mut buf), format).unwrap(),
    }
    buf
}

pub fn png_file(name: &str, img: &RgbaImage) -> FileHandle {
    FileHandle::new(name, "image/png", encode(img, ImageFormat::Png))
}

pub fn jpeg_file(name: &str, img: &RgbaImage) -> FileHandle {
    FileHandle::new(name, "image/jpeg", encode(img, ImageFormat::Jpeg))
}

/// Decode an exported blob back into RGBA.
pub fn decode(blob: &[u8]) -> RgbaImage {
    image::load_from_memory(blob).unwrap().into_rgba8()
}
