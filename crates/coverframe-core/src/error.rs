use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("File is too large: {size} bytes (maximum is {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file type '{mime}' (accepted: {})", accepted.join(", "))]
    InvalidFileType { mime: String, accepted: Vec<String> },

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Could not decode image: {0}")]
    DecodeError(String),

    #[error("Could not encode cropped image: {0}")]
    EncodingFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CropError {
    /// True for failures detected before any decoding took place.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::FileTooLarge { .. } | Self::InvalidFileType { .. } | Self::InvalidFile(_)
        )
    }

    /// Stable machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "file_too_large",
            Self::InvalidFileType { .. } => "invalid_file_type",
            Self::InvalidFile(_) => "invalid_file",
            Self::DecodeError(_) => "decode_error",
            Self::EncodingFailed(_) => "encoding_failed",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, CropError>;
