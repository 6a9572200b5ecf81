use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use coverframe_core::config::Preset;

use super::PresetArg;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image field to generate the config for
    #[arg(long, value_enum, default_value = "course")]
    pub preset: PresetArg,
}

/// Print or save a full default CropConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = Preset::from(args.preset).config();
    let toml_str = config.to_toml_string()?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
