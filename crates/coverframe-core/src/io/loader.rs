use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::config::CropConfig;
use crate::error::{CropError, Result};

/// A file picked by the user: raw bytes plus what the picker reported about it.
#[derive(Clone, Debug)]
pub struct FileHandle {
    pub name: String,
    /// Declared MIME type. May be empty when the host could not tell.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring the MIME type implied by its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mime_type = mime_from_name(&name).unwrap_or_default().to_string();
        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared MIME type, normalized. Falls back to the file extension.
    pub fn effective_mime(&self) -> String {
        let declared = normalize_mime(&self.mime_type);
        if declared.is_empty() {
            mime_from_name(&self.name).unwrap_or_default().to_string()
        } else {
            declared
        }
    }
}

/// Lower-case a MIME type and drop any `;` parameters.
fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn mime_from_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?;
    ImageFormat::from_extension(ext).map(|f| f.to_mime_type())
}

/// A decoded source image. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct SourceImage {
    file_name: String,
    format: ImageFormat,
    has_alpha: bool,
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Format detected from the file content.
    pub fn detected_format(&self) -> ImageFormat {
        self.format
    }

    /// Whether the source carried an alpha channel before RGBA conversion.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Validates picked files and decodes them into [`SourceImage`]s.
#[derive(Clone, Debug)]
pub struct SourceLoader {
    max_size_bytes: u64,
    accepted: Vec<String>,
}

impl SourceLoader {
    pub fn new(config: &CropConfig) -> Self {
        Self {
            max_size_bytes: config.max_size_bytes,
            accepted: config
                .accepted_mime_types
                .iter()
                .map(|m| normalize_mime(m))
                .collect(),
        }
    }

    /// Check size and type without decoding anything.
    pub fn validate(&self, file: &FileHandle) -> Result<()> {
        if file.bytes.is_empty() {
            return Err(CropError::InvalidFile(format!("'{}' is empty", file.name)));
        }

        let size = file.size();
        if size > self.max_size_bytes {
            return Err(CropError::FileTooLarge {
                size,
                max: self.max_size_bytes,
            });
        }

        let mime = file.effective_mime();
        if !self.accepted.iter().any(|a| *a == mime) {
            return Err(CropError::InvalidFileType {
                mime,
                accepted: self.accepted.clone(),
            });
        }

        Ok(())
    }

    /// Only single-file selections are allowed.
    pub fn validate_selection<'a>(&self, files: &'a [FileHandle]) -> Result<&'a FileHandle> {
        match files {
            [file] => {
                self.validate(file)?;
                Ok(file)
            }
            [] => Err(CropError::InvalidFile("no file selected".into())),
            _ => Err(CropError::InvalidFile(format!(
                "only one file can be selected, got {}",
                files.len()
            ))),
        }
    }

    /// Validate, then decode the file at its natural resolution.
    pub fn load(&self, file: FileHandle) -> Result<SourceImage> {
        self.validate(&file)?;
        decode(file)
    }

    pub fn load_selection(&self, mut files: Vec<FileHandle>) -> Result<SourceImage> {
        self.validate_selection(&files)?;
        // validate_selection guarantees exactly one element
        match files.pop() {
            Some(file) => decode(file),
            None => Err(CropError::InvalidFile("no file selected".into())),
        }
    }
}

fn decode(file: FileHandle) -> Result<SourceImage> {
    let format =
        image::guess_format(&file.bytes).map_err(|e| CropError::DecodeError(e.to_string()))?;
    let img = image::load_from_memory_with_format(&file.bytes, format)
        .map_err(|e| CropError::DecodeError(e.to_string()))?;

    let (width, height) = (img.width(), img.height());
    check_dimensions(width, height)?;

    let has_alpha = img.color().has_alpha();
    debug!(?format, has_alpha, "Decoded source");
    info!(name = %file.name, width, height, "Source image loaded");

    Ok(SourceImage {
        file_name: file.name,
        format,
        has_alpha,
        pixels: img.into_rgba8(),
    })
}

/// A decoded raster must have at least one pixel.
fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CropError::DecodeError(format!(
            "image has zero dimension: {width}x{height}"
        )));
    }
    Ok(())
}
