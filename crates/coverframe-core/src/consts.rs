/// Minimum output pixel count (w*h) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default upload size limit: 5 MiB.
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted by default.
pub const DEFAULT_ACCEPTED_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
];

/// Default export width in pixels.
pub const DEFAULT_TARGET_WIDTH: u32 = 800;

/// Default export height in pixels.
pub const DEFAULT_TARGET_HEIGHT: u32 = 600;

/// Default on-screen width of the crop box, in display pixels.
pub const DEFAULT_MAX_DISPLAY_WIDTH: f64 = 520.0;

/// Default encoder quality on the 0-100 scale.
pub const DEFAULT_QUALITY: u8 = 90;

/// Lower bound of normalized encoder quality (0.0-1.0 scale).
pub const MIN_NORMALIZED_QUALITY: f32 = 0.1;

/// Upper bound of normalized encoder quality (0.0-1.0 scale).
pub const MAX_NORMALIZED_QUALITY: f32 = 1.0;

/// Zoom slider lower bound. 1.0 is the cover fit.
pub const MIN_ZOOM: f64 = 1.0;

/// Zoom slider upper bound.
pub const MAX_ZOOM: f64 = 3.0;

/// Largest per-axis supersampling factor used when the source rectangle
/// is bigger than the output surface.
pub const MAX_SUPERSAMPLE: u32 = 4;

/// Colour that transparent pixels are flattened onto for formats without alpha.
pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Base name used when the source file name has no usable stem.
pub const FALLBACK_FILE_STEM: &str = "image";
