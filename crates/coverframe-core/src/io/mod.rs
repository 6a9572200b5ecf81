pub mod export;
pub mod loader;

pub use export::{encode, export_filename, normalize_quality, ExportResult};
pub use loader::{FileHandle, SourceImage, SourceLoader};
