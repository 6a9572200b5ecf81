pub mod config;
pub mod crop;
pub mod info;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use coverframe_core::config::{CropConfig, Preset};

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    /// Course cover image, 800x600
    Course,
    /// Profile picture, 400x400
    Avatar,
    /// Category banner, 1200x400
    Banner,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Course => Preset::Course,
            PresetArg::Avatar => Preset::Avatar,
            PresetArg::Banner => Preset::Banner,
        }
    }
}

/// Resolve the crop configuration: a TOML file wins over a preset.
pub fn load_config(config: Option<&PathBuf>, preset: PresetArg) -> Result<CropConfig> {
    match config {
        Some(path) => CropConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Preset::from(preset).config()),
    }
}
