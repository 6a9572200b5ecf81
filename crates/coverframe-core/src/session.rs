use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::config::CropConfig;
use crate::error::{CropError, Result};
use crate::geometry::{CropBoxGeometry, Offset, Point, SourceRect};
use crate::io::export::{encode, export_filename, ExportResult};
use crate::io::loader::{FileHandle, SourceImage, SourceLoader};
use crate::raster::{self, CpuRasterizer, RasterBackend};
use crate::viewport::{DragState, ViewportModel, ViewportState};

/// Display-resolution copy of the source, shown behind the crop box.
///
/// Counted in its owner's live-preview counter until dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    image: Arc<RgbaImage>,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    fn new(source: &SourceImage, display: (f64, f64), live: Arc<AtomicUsize>) -> Self {
        let (w, h) = (source.natural_width(), source.natural_height());
        let pw = (display.0.round() as u32).clamp(1, w);
        let ph = (display.1.round() as u32).clamp(1, h);

        let image = if pw < w || ph < h {
            imageops::resize(source.pixels(), pw, ph, FilterType::Triangle)
        } else {
            source.pixels().clone()
        };

        live.fetch_add(1, Ordering::SeqCst);
        debug!(width = image.width(), height = image.height(), "Preview created");
        Self {
            image: Arc::new(image),
            live,
        }
    }

    pub fn image(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.image)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!("Preview released");
    }
}

/// One open crop: the decoded source, its viewport and the drag in progress.
#[derive(Debug)]
pub struct CropSession {
    source: SourceImage,
    config: CropConfig,
    viewport: ViewportModel,
    drag: DragState,
    preview: PreviewHandle,
}

impl CropSession {
    fn new(source: SourceImage, config: &CropConfig, live: Arc<AtomicUsize>) -> Result<Self> {
        let viewport = ViewportModel::new(
            source.natural_width(),
            source.natural_height(),
            config.crop_box(),
            config.zoom_range,
        )?;
        let preview = PreviewHandle::new(&source, viewport.scaled_size(1.0), live);

        Ok(Self {
            source,
            config: config.clone(),
            viewport,
            drag: DragState::Idle,
            preview,
        })
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn crop_box(&self) -> CropBoxGeometry {
        self.viewport.crop_box()
    }

    pub fn viewport(&self) -> &ViewportModel {
        &self.viewport
    }

    pub fn state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn pointer_down(&mut self, pointer: Point) {
        self.drag.pointer_down(pointer, self.viewport.offset());
    }

    /// Returns the clamped offset, or `None` when no drag is in progress.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<Offset> {
        let candidate = self.drag.pointer_move(pointer)?;
        self.viewport.pan_to(candidate);
        Some(self.viewport.offset())
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    /// End any in-flight drag. The offset already holds the clamped drag
    /// position, so exports never depend on the drag state.
    pub fn settle(&mut self) {
        if self.drag.is_dragging() {
            debug!("Ending in-flight drag before export");
            self.drag.pointer_up();
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.viewport.zoom_by(delta);
    }

    pub fn reset_view(&mut self) {
        self.drag.pointer_up();
        self.viewport.reset();
    }

    /// Natural-pixel rectangle that the crop box currently shows.
    pub fn source_rect(&self) -> SourceRect {
        raster::source_rect(
            &self.viewport.state(),
            self.viewport.natural_size(),
            self.viewport.cover_scale(),
            self.viewport.crop_box(),
        )
    }

    /// Rasterize the current crop at the target size and encode it.
    pub fn export(&self, backend: &dyn RasterBackend) -> Result<ExportResult> {
        let src = self.source_rect();
        let target = self.config.target_size();
        let format = self.config.output_format;

        let surface = backend.draw_region(self.source.pixels(), src, target)?;
        if surface.dimensions() != (target.width, target.height) {
            return Err(CropError::EncodingFailed(format!(
                "{} produced {}x{}, expected {}x{}",
                backend.name(),
                surface.width(),
                surface.height(),
                target.width,
                target.height
            )));
        }

        let blob = encode(&surface, format, self.config.quality, self.config.background)?;
        let filename = export_filename(self.source.file_name(), format);

        info!(
            backend = backend.name(),
            src_x = src.x,
            src_y = src.y,
            src_w = src.width,
            src_h = src.height,
            bytes = blob.len(),
            %filename,
            "Crop exported"
        );

        Ok(ExportResult {
            blob,
            filename,
            mime_type: format.mime_type().to_string(),
            width: target.width,
            height: target.height,
        })
    }
}

/// Hosts at most one crop session at a time.
///
/// Opening a new file replaces the current session; cancelling or a
/// successful confirm discards it.
#[derive(Debug)]
pub struct CropEditor<B: RasterBackend = CpuRasterizer> {
    config: CropConfig,
    loader: SourceLoader,
    backend: B,
    session: Option<CropSession>,
    live_previews: Arc<AtomicUsize>,
}

impl CropEditor<CpuRasterizer> {
    pub fn new(config: CropConfig) -> Result<Self> {
        Self::with_backend(config, CpuRasterizer)
    }
}

impl<B: RasterBackend> CropEditor<B> {
    pub fn with_backend(config: CropConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            loader: SourceLoader::new(&config),
            config,
            backend,
            session: None,
            live_previews: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Load `file` into a fresh session. On failure any open session is kept.
    pub fn open(&mut self, file: FileHandle) -> Result<&mut CropSession> {
        let source = self.loader.load(file)?;
        self.install(source)
    }

    /// Like [`open`](Self::open) for a picker that may hand over several files.
    pub fn open_selection(&mut self, files: Vec<FileHandle>) -> Result<&mut CropSession> {
        let source = self.loader.load_selection(files)?;
        self.install(source)
    }

    fn install(&mut self, source: SourceImage) -> Result<&mut CropSession> {
        let session = CropSession::new(source, &self.config, Arc::clone(&self.live_previews))?;
        if self.session.is_some() {
            info!("Replacing open crop session");
        }
        Ok(self.session.insert(session))
    }

    pub fn session(&self) -> Option<&CropSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut CropSession> {
        self.session.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Close without producing anything.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            info!("Crop session cancelled");
        }
    }

    /// Export the open session. On success any in-flight drag is ended and
    /// the session is discarded; on failure the session, drag included, is
    /// left exactly as it was so the user can retry.
    pub fn confirm(&mut self) -> Result<ExportResult> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| CropError::InvalidFile("no image loaded".into()))?;

        match session.export(&self.backend) {
            Ok(result) => {
                if let Some(mut session) = self.session.take() {
                    session.settle();
                }
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Export failed, session kept for retry");
                Err(e)
            }
        }
    }

    /// Number of preview handles that have not been released yet.
    pub fn live_previews(&self) -> usize {
        self.live_previews.load(Ordering::SeqCst)
    }
}
