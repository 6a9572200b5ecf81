use tracing::debug;

use crate::config::ZoomRange;
use crate::error::{CropError, Result};
use crate::geometry::{CropBoxGeometry, Offset};

/// Zoom and pan of the source image behind the crop box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// 1.0 is the cover fit.
    pub zoom: f64,
    pub offset: Offset,
}

/// Keeps a [`ViewportState`] that always covers the crop box.
///
/// The scaled source image, translated by `offset`, must contain the whole
/// crop box at every zoom. All mutations clamp the offset to
/// `[-max_x, max_x] x [-max_y, max_y]`.
#[derive(Clone, Debug)]
pub struct ViewportModel {
    natural_width: f64,
    natural_height: f64,
    crop_box: CropBoxGeometry,
    cover_scale: f64,
    zoom_range: ZoomRange,
    state: ViewportState,
}

impl ViewportModel {
    /// Build a model centred at the minimum zoom.
    ///
    /// Zero-sized sources never reach this point through the loader; they
    /// are rejected here as a decode error as well.
    pub fn new(
        natural_width: u32,
        natural_height: u32,
        crop_box: CropBoxGeometry,
        zoom_range: ZoomRange,
    ) -> Result<Self> {
        if natural_width == 0 || natural_height == 0 {
            return Err(CropError::DecodeError(format!(
                "image has zero dimension: {natural_width}x{natural_height}"
            )));
        }
        if !(crop_box.width > 0.0 && crop_box.height > 0.0) {
            return Err(CropError::Config(format!(
                "crop box must be non-empty, got {}x{}",
                crop_box.width, crop_box.height
            )));
        }
        zoom_range.validate()?;

        let natural_width = natural_width as f64;
        let natural_height = natural_height as f64;
        let cover_scale =
            (crop_box.width / natural_width).max(crop_box.height / natural_height);

        let mut model = Self {
            natural_width,
            natural_height,
            crop_box,
            cover_scale,
            zoom_range,
            state: ViewportState {
                zoom: zoom_range.min,
                offset: Offset::ZERO,
            },
        };
        model.reset();
        Ok(model)
    }

    /// Smallest scale at which the centred source covers the crop box.
    pub fn cover_scale(&self) -> f64 {
        self.cover_scale
    }

    pub fn crop_box(&self) -> CropBoxGeometry {
        self.crop_box
    }

    pub fn natural_size(&self) -> (f64, f64) {
        (self.natural_width, self.natural_height)
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn offset(&self) -> Offset {
        self.state.offset
    }

    /// Display-space size of the source at `zoom`.
    pub fn scaled_size(&self, zoom: f64) -> (f64, f64) {
        let scale = self.cover_scale * zoom;
        (self.natural_width * scale, self.natural_height * scale)
    }

    /// Largest allowed pan on each axis at `zoom`.
    pub fn max_offset(&self, zoom: f64) -> (f64, f64) {
        let (scaled_w, scaled_h) = self.scaled_size(zoom);
        (
            ((scaled_w - self.crop_box.width) / 2.0).max(0.0),
            ((scaled_h - self.crop_box.height) / 2.0).max(0.0),
        )
    }

    /// Clamp a candidate offset so the source still covers the crop box.
    /// Non-finite components are treated as zero.
    pub fn clamp(&self, candidate: Offset, zoom: f64) -> Offset {
        let (max_x, max_y) = self.max_offset(zoom);
        Offset::new(clamp_axis(candidate.x, max_x), clamp_axis(candidate.y, max_y))
    }

    /// Move the image to `candidate`, clamped at the current zoom.
    pub fn pan_to(&mut self, candidate: Offset) {
        self.state.offset = self.clamp(candidate, self.state.zoom);
    }

    /// Set the zoom, silently clamped to the zoom range, and re-clamp the
    /// current offset. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            debug!(zoom, "Ignoring non-finite zoom");
            return;
        }
        let zoom = self.zoom_range.clamp(zoom);
        self.state.zoom = zoom;
        self.state.offset = self.clamp(self.state.offset, zoom);
    }

    /// Relative zoom step, e.g. from a scroll wheel.
    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.state.zoom + delta);
    }

    /// Back to the centred cover fit.
    pub fn reset(&mut self) {
        let zoom = self.zoom_range.min;
        self.state = ViewportState {
            zoom,
            offset: self.clamp(Offset::ZERO, zoom),
        };
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.max(-max).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(w: u32, h: u32) -> ViewportModel {
        let crop_box = CropBoxGeometry {
            width: 520.0,
            height: 390.0,
        };
        ViewportModel::new(w, h, crop_box, ZoomRange::default()).unwrap()
    }

    #[test]
    fn clamp_axis_handles_non_finite() {
        assert_eq!(clamp_axis(f64::NAN, 10.0), 0.0);
        assert_eq!(clamp_axis(f64::INFINITY, 10.0), 0.0);
        assert_eq!(clamp_axis(-25.0, 10.0), -10.0);
        assert_eq!(clamp_axis(3.0, 0.0), 0.0);
    }

    #[test]
    fn binding_axis_has_no_freedom_at_cover_fit() {
        let m = model(2000, 1000);
        let (max_x, max_y) = m.max_offset(1.0);
        assert!(max_x > 0.0);
        assert!(max_y.abs() < 1e-9);
    }

    #[test]
    fn zoom_out_pulls_offset_back_inside() {
        let mut m = model(1000, 1000);
        m.set_zoom(3.0);
        m.pan_to(Offset::new(10_000.0, -10_000.0));
        let (max_x, max_y) = m.max_offset(3.0);
        assert_eq!(m.offset(), Offset::new(max_x, -max_y));

        m.set_zoom(1.5);
        let (max_x, max_y) = m.max_offset(1.5);
        assert_eq!(m.offset(), Offset::new(max_x, -max_y));
    }

    #[test]
    fn zero_dimension_rejected() {
        let crop_box = CropBoxGeometry {
            width: 100.0,
            height: 100.0,
        };
        let err = ViewportModel::new(0, 10, crop_box, ZoomRange::default()).unwrap_err();
        assert!(matches!(err, CropError::DecodeError(_)));
    }
}
