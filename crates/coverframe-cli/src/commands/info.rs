use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use coverframe_core::io::loader::FileHandle;
use coverframe_core::session::CropEditor;
use serde::Serialize;

use super::{load_config, PresetArg};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,

    /// Image field the crop window is computed for
    #[arg(long, value_enum, default_value = "course")]
    pub preset: PresetArg,

    /// TOML config file (overrides --preset)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report as TOML
    #[arg(long)]
    pub toml: bool,
}

#[derive(Serialize)]
struct InfoReport {
    file: String,
    mime_type: String,
    size_bytes: u64,
    format: String,
    width: u32,
    height: u32,
    has_alpha: bool,
    target: [u32; 2],
    crop_box: [f64; 2],
    cover_scale: f64,
    /// Default source window as [x, y, width, height].
    source_rect: [f64; 4],
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = load_config(args.config.as_ref(), args.preset)?;
    let file = FileHandle::from_path(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mime_type = file.effective_mime();
    let size_bytes = file.size();

    let target = config.target_size();
    let mut editor = CropEditor::new(config)?;
    let session = editor.open(file)?;
    let source = session.source();
    let crop_box = session.crop_box();
    let rect = session.source_rect();

    let report = InfoReport {
        file: source.file_name().to_string(),
        mime_type,
        size_bytes,
        format: format!("{:?}", source.detected_format()),
        width: source.natural_width(),
        height: source.natural_height(),
        has_alpha: source.has_alpha(),
        target: [target.width, target.height],
        crop_box: [crop_box.width, crop_box.height],
        cover_scale: session.viewport().cover_scale(),
        source_rect: [rect.x, rect.y, rect.width, rect.height],
    };

    if args.toml {
        print!("{}", toml::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File:         {}", style(&report.file).bold());
    println!("MIME type:    {}", report.mime_type);
    println!("Format:       {}", report.format);
    println!("Size:         {:.1} KB", report.size_bytes as f64 / 1024.0);
    println!("Dimensions:   {}x{}", report.width, report.height);
    println!("Alpha:        {}", if report.has_alpha { "yes" } else { "no" });
    println!("Target:       {}x{}", target.width, target.height);
    println!("Crop box:     {:.0}x{:.0}", crop_box.width, crop_box.height);
    println!("Cover scale:  {:.4}", report.cover_scale);
    println!(
        "Default crop: {:.1},{:.1} {:.1}x{:.1}",
        rect.x, rect.y, rect.width, rect.height
    );

    editor.cancel();
    Ok(())
}
