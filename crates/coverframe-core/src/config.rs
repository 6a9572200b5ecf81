use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_ACCEPTED_MIME_TYPES, DEFAULT_BACKGROUND, DEFAULT_MAX_DISPLAY_WIDTH,
    DEFAULT_MAX_SIZE_BYTES, DEFAULT_QUALITY, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH,
    MAX_ZOOM, MIN_ZOOM,
};
use crate::error::{CropError, Result};
use crate::geometry::{CropBoxGeometry, TargetSize};

/// Everything a crop session needs to know about the image field it serves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Upload size limit in bytes.
    pub max_size_bytes: u64,
    /// MIME types the source loader accepts.
    pub accepted_mime_types: Vec<String>,
    /// Exported image width in pixels.
    pub target_width: u32,
    /// Exported image height in pixels.
    pub target_height: u32,
    /// On-screen width of the crop box.
    pub max_display_width: f64,
    /// Encoder quality, 0-100. Values above 100 act as 100.
    pub quality: u8,
    pub output_format: OutputFormat,
    /// RGB colour transparent pixels are flattened onto for JPEG output.
    pub background: [u8; 3],
    pub zoom_range: ZoomRange,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            accepted_mime_types: DEFAULT_ACCEPTED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            quality: DEFAULT_QUALITY,
            output_format: OutputFormat::default(),
            background: DEFAULT_BACKGROUND,
            zoom_range: ZoomRange::default(),
        }
    }
}

impl CropConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| CropError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CropError::Config(e.to_string()))
    }

    /// Check that the configuration can drive a crop session.
    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(CropError::Config(format!(
                "target size must be non-zero, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if !self.max_display_width.is_finite() || self.max_display_width <= 0.0 {
            return Err(CropError::Config(format!(
                "max_display_width must be positive, got {}",
                self.max_display_width
            )));
        }
        self.zoom_range.validate()?;
        if self.accepted_mime_types.is_empty() {
            return Err(CropError::Config(
                "accepted_mime_types must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn target_size(&self) -> TargetSize {
        TargetSize {
            width: self.target_width,
            height: self.target_height,
        }
    }

    /// Crop box geometry derived from the target aspect ratio.
    pub fn crop_box(&self) -> CropBoxGeometry {
        CropBoxGeometry::from_target(self.target_size(), self.max_display_width)
    }
}

/// Allowed range of the zoom slider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
        }
    }
}

impl ZoomRange {
    pub fn validate(&self) -> Result<()> {
        // Below 1.0 the image would no longer cover the crop box.
        if !(self.min.is_finite() && self.max.is_finite())
            || self.min < MIN_ZOOM
            || self.max < self.min
        {
            return Err(CropError::Config(format!(
                "zoom range must satisfy 1 <= min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Clamp a zoom value into the range.
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

/// Encoding of the exported blob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub const ALL: &[Self] = &[Self::Jpeg, Self::Png];

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Whether the encoding can carry an alpha channel.
    pub fn supports_alpha(&self) -> bool {
        matches!(self, Self::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => write!(f, "JPEG"),
            Self::Png => write!(f, "PNG"),
        }
    }
}

/// Named image fields with fixed export sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Course cover image, 4:3.
    #[default]
    Course,
    /// Square profile picture.
    Avatar,
    /// Wide category banner, 3:1.
    Banner,
}

impl Preset {
    pub const ALL: &[Self] = &[Self::Course, Self::Avatar, Self::Banner];

    pub fn target_size(&self) -> TargetSize {
        let (width, height) = match self {
            Self::Course => (800, 600),
            Self::Avatar => (400, 400),
            Self::Banner => (1200, 400),
        };
        TargetSize { width, height }
    }

    pub fn config(&self) -> CropConfig {
        let target = self.target_size();
        CropConfig {
            target_width: target.width,
            target_height: target.height,
            ..CropConfig::default()
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Course => write!(f, "Course"),
            Self::Avatar => write!(f, "Avatar"),
            Self::Banner => write!(f, "Banner"),
        }
    }
}
