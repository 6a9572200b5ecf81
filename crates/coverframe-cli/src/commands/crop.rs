use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use coverframe_core::config::OutputFormat;
use coverframe_core::geometry::Point;
use coverframe_core::io::loader::FileHandle;
use coverframe_core::session::CropEditor;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::{load_config, PresetArg};

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Lossy JPEG (default)
    Jpeg,
    /// Lossless PNG, keeps transparency
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

/// Pointer travel of one drag gesture, in display pixels.
#[derive(Clone, Copy, Debug)]
pub struct DragDelta {
    pub dx: f64,
    pub dy: f64,
}

fn parse_drag(s: &str) -> std::result::Result<DragDelta, String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{s}'"))?;
    let dx = dx.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let dy = dy.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(DragDelta { dx, dy })
}

#[derive(Args)]
pub struct CropArgs {
    /// Input image file
    pub file: PathBuf,

    /// Image field to crop for
    #[arg(long, value_enum, default_value = "course")]
    pub preset: PresetArg,

    /// TOML config file (overrides --preset)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Zoom factor, clamped to the configured range (1.0 = cover fit)
    #[arg(long, default_value = "1.0")]
    pub zoom: f64,

    /// Drag gesture as DX,DY display pixels; repeat for several drags
    #[arg(long = "drag", value_parser = parse_drag, allow_hyphen_values = true)]
    pub drags: Vec<DragDelta>,

    /// Encoder quality 0-100 (overrides config)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Output format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output file (auto-generated if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &CropArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref(), args.preset)?;
    if let Some(q) = args.quality {
        config.quality = q;
    }
    if let Some(f) = args.format {
        config.output_format = f.into();
    }

    let file = FileHandle::from_path(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut editor = CropEditor::new(config)?;
    let session = editor
        .open(file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    println!(
        "Loaded {} ({}x{})",
        style(session.source().file_name()).bold(),
        session.source().natural_width(),
        session.source().natural_height()
    );

    session.set_zoom(args.zoom);
    for drag in &args.drags {
        session.pointer_down(Point::new(0.0, 0.0));
        let offset = session.pointer_move(Point::new(drag.dx, drag.dy));
        session.pointer_up();
        debug!(dx = drag.dx, dy = drag.dy, ?offset, "Replayed drag");
    }

    let state = session.state();
    let rect = session.source_rect();
    println!(
        "Zoom {:.2}, offset ({:.1}, {:.1}) -> source {:.1},{:.1} {:.1}x{:.1}",
        state.zoom, state.offset.x, state.offset.y, rect.x, rect.y, rect.width, rect.height
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message("Exporting...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = editor.confirm();
    spinner.finish_and_clear();
    let result = result?;

    let output_path = args.output.clone().unwrap_or_else(|| {
        crop_output_path(&args.file, &result.filename, result.width, result.height)
    });

    std::fs::write(&output_path, &result.blob)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!(
        "Saved {}x{} {} ({:.1} KB) to {}",
        result.width,
        result.height,
        result.mime_type,
        result.blob.len() as f64 / 1024.0,
        style(output_path.display()).green()
    );
    Ok(())
}

fn crop_output_path(source: &Path, export_name: &str, w: u32, h: u32) -> PathBuf {
    let export = Path::new(export_name);
    let stem = export
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = export
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    let parent = source.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_crop{w}x{h}.{ext}"))
}
