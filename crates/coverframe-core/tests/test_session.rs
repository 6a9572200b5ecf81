mod common;

use approx::assert_relative_eq;
use image::RgbaImage;

use coverframe_core::config::CropConfig;
use coverframe_core::error::{CropError, Result};
use coverframe_core::geometry::{Offset, Point, SourceRect, TargetSize};
use coverframe_core::io::loader::FileHandle;
use coverframe_core::raster::RasterBackend;
use coverframe_core::session::CropEditor;

/// Backend whose surfaces always come out the wrong size.
#[derive(Debug)]
struct BrokenBackend;

impl RasterBackend for BrokenBackend {
    fn name(&self) -> &str {
        "broken"
    }

    fn draw_region(&self, _: &RgbaImage, _: SourceRect, _: TargetSize) -> Result<RgbaImage> {
        Ok(RgbaImage::new(1, 1))
    }
}

fn wide_png() -> FileHandle {
    common::png_file("wide.png", &common::gradient(2000, 1000))
}

#[test]
fn test_oversized_file_creates_no_session() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let big = FileHandle::new("big.png", "image/png", vec![0u8; 10 * 1024 * 1024]);

    let err = editor.open(big).unwrap_err();
    assert!(matches!(err, CropError::FileTooLarge { .. }));
    assert!(!editor.is_open());
    assert_eq!(editor.live_previews(), 0);
}

#[test]
fn test_drag_pans_and_clamps() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let session = editor.open(wide_png()).unwrap();

    // At zoom 1 the wide image can only move horizontally.
    session.pointer_down(Point::new(200.0, 200.0));
    assert!(session.is_dragging());
    let offset = session.pointer_move(Point::new(250.0, 260.0)).unwrap();
    assert_relative_eq!(offset.x, 50.0, epsilon = 1e-9);
    assert_relative_eq!(offset.y, 0.0, epsilon = 1e-9);

    // Moves are relative to the drag start, not cumulative.
    let offset = session.pointer_move(Point::new(190.0, 200.0)).unwrap();
    assert_relative_eq!(offset.x, -10.0, epsilon = 1e-9);

    session.pointer_up();
    assert!(!session.is_dragging());
    assert_eq!(session.pointer_move(Point::new(0.0, 0.0)), None);
    assert_relative_eq!(session.state().offset.x, -10.0, epsilon = 1e-9);

    // A new drag starts from the settled offset.
    session.pointer_down(Point::new(0.0, 0.0));
    let offset = session.pointer_move(Point::new(-5000.0, 0.0)).unwrap();
    let (max_x, _) = session.viewport().max_offset(1.0);
    assert_relative_eq!(offset.x, -max_x, epsilon = 1e-9);
}

#[test]
fn test_zoom_reclamps_existing_offset() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let session = editor.open(wide_png()).unwrap();

    session.set_zoom(3.0);
    session.pointer_down(Point::new(0.0, 0.0));
    session.pointer_move(Point::new(0.0, 10_000.0));
    session.pointer_up();
    let (_, max_y) = session.viewport().max_offset(3.0);
    assert_relative_eq!(session.state().offset.y, max_y, epsilon = 1e-9);

    session.set_zoom(1.0);
    assert_relative_eq!(session.state().offset.y, 0.0, epsilon = 1e-6);
}

#[test]
fn test_cancel_discards_session_and_preview() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    editor.open(wide_png()).unwrap();
    assert_eq!(editor.live_previews(), 1);

    editor.cancel();
    assert!(!editor.is_open());
    assert_eq!(editor.live_previews(), 0);
    assert!(matches!(editor.confirm(), Err(CropError::InvalidFile(_))));
}

#[test]
fn test_open_replaces_previous_session() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    editor.open(wide_png()).unwrap();
    for i in 0..5 {
        let name = format!("tall{i}.png");
        editor
            .open(common::png_file(&name, &common::gradient(300, 900)))
            .unwrap();
        assert_eq!(editor.live_previews(), 1);
    }

    let session = editor.session().unwrap();
    assert_eq!(session.source().file_name(), "tall4.png");
    assert_eq!(session.state().zoom, 1.0);
    assert_eq!(session.state().offset, Offset::ZERO);
}

#[test]
fn test_failed_open_keeps_previous_session() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let session = editor.open(wide_png()).unwrap();
    session.set_zoom(2.0);

    let garbage = FileHandle::new("bad.png", "image/png", b"garbage bytes".to_vec());
    assert!(matches!(editor.open(garbage), Err(CropError::DecodeError(_))));

    let wrong_type = FileHandle::new("doc.pdf", "application/pdf", vec![1, 2, 3]);
    assert!(matches!(
        editor.open(wrong_type),
        Err(CropError::InvalidFileType { .. })
    ));

    let session = editor.session().unwrap();
    assert_eq!(session.source().file_name(), "wide.png");
    assert_eq!(session.state().zoom, 2.0);
    assert_eq!(editor.live_previews(), 1);
}

#[test]
fn test_encoding_failure_keeps_session_for_retry() {
    let mut editor = CropEditor::with_backend(CropConfig::default(), BrokenBackend).unwrap();
    let session = editor.open(wide_png()).unwrap();
    session.set_zoom(1.5);

    let err = editor.confirm().unwrap_err();
    assert!(matches!(err, CropError::EncodingFailed(_)));
    assert_eq!(err.kind(), "encoding_failed");
    assert!(editor.is_open());
    assert_eq!(editor.session().unwrap().state().zoom, 1.5);
}

#[test]
fn test_failed_confirm_leaves_inflight_drag_untouched() {
    let mut editor = CropEditor::with_backend(CropConfig::default(), BrokenBackend).unwrap();
    let session = editor.open(wide_png()).unwrap();
    session.pointer_down(Point::new(0.0, 0.0));
    session.pointer_move(Point::new(40.0, 0.0));
    let before = session.state();

    assert!(editor.confirm().is_err());
    let session = editor.session_mut().unwrap();
    assert!(session.is_dragging());
    assert_eq!(session.state(), before);

    // The drag carries on from where it was.
    let moved = session.pointer_move(Point::new(50.0, 0.0)).unwrap();
    assert_relative_eq!(moved.x, 50.0);

    session.settle();
    assert!(!session.is_dragging());
    assert_eq!(session.pointer_move(Point::new(90.0, 0.0)), None);
}

#[test]
fn test_confirm_settles_inflight_drag() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let session = editor.open(wide_png()).unwrap();
    session.pointer_down(Point::new(0.0, 0.0));
    session.pointer_move(Point::new(40.0, 0.0));
    assert!(session.is_dragging());

    let result = editor.confirm().unwrap();
    assert_eq!((result.width, result.height), (800, 600));
    assert!(!editor.is_open());
    assert_eq!(editor.live_previews(), 0);
}

#[test]
fn test_open_selection_rejects_multiple_files() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let err = editor.open_selection(vec![wide_png(), wide_png()]).unwrap_err();
    assert!(matches!(err, CropError::InvalidFile(_)));
    assert!(!editor.is_open());

    editor.open_selection(vec![wide_png()]).unwrap();
    assert!(editor.is_open());
}

#[test]
fn test_preview_is_display_sized() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let session = editor.open(wide_png()).unwrap();
    let preview = session.preview().image();
    // 2000x1000 at cover scale 0.39 is 780x390 on screen.
    assert_eq!(preview.dimensions(), (780, 390));

    let small = common::png_file("small.png", &common::gradient(100, 50));
    let session = editor.open(small).unwrap();
    // Never upscaled.
    assert_eq!(session.preview().image().dimensions(), (100, 50));
}

#[test]
fn test_reset_view_recenters() {
    let mut editor = CropEditor::new(CropConfig::default()).unwrap();
    let session = editor.open(wide_png()).unwrap();
    session.set_zoom(2.5);
    session.pointer_down(Point::new(0.0, 0.0));
    session.pointer_move(Point::new(33.0, -12.0));

    session.reset_view();
    assert!(!session.is_dragging());
    assert_eq!(session.state().zoom, 1.0);
    assert_eq!(session.state().offset, Offset::ZERO);
}

#[test]
fn test_invalid_config_rejected() {
    let config = CropConfig {
        target_width: 0,
        ..CropConfig::default()
    };
    assert!(matches!(
        CropEditor::new(config),
        Err(CropError::Config(_))
    ));
}
