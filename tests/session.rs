use image::{Rgba, RgbaImage};

use snapedit::{
    ColorMode, CropRegion, EditorError, EditorSession, MAX_HISTORY_STEPS, Notice, Rgb,
    SourceFormat,
};

fn session_with(image: RgbaImage) -> EditorSession {
    let mut session = EditorSession::default();
    session.load_image(image, SourceFormat::Png, "test.png").unwrap();
    session
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn raw(session: &EditorSession) -> Vec<u8> {
    session.buffer().unwrap().as_raw().to_vec()
}

#[test]
fn empty_session_rejects_every_edit() {
    let mut session = EditorSession::default();
    assert!(matches!(session.resize(10, 10), Err(EditorError::NoImageLoaded)));
    assert!(matches!(
        session.crop(CropRegion::new(0, 0, 1, 1)),
        Err(EditorError::NoImageLoaded)
    ));
    assert!(matches!(
        session.apply_color_op(Rgb::new(0, 0, 0), 10.0, ColorMode::Erase),
        Err(EditorError::NoImageLoaded)
    ));
    assert!(matches!(session.reset_to_original(), Err(EditorError::NoImageLoaded)));
    assert!(matches!(session.undo(), Err(EditorError::NoImageLoaded)));
    assert!(matches!(session.redo(), Err(EditorError::NoImageLoaded)));
    assert!(matches!(session.pick_color(0, 0), Err(EditorError::NoImageLoaded)));
    assert!(session.export_svg().is_err());
}

#[test]
fn loading_starts_a_single_entry_history() {
    let session = session_with(gradient(8, 6));
    assert_eq!(session.history().len(), 1);
    assert!(!session.history().can_undo());
    assert!(!session.history().can_redo());
    assert_eq!(session.original_dimensions().unwrap(), (8, 6));
    assert!(session.show_checkerboard());
}

#[test]
fn history_never_exceeds_twenty_snapshots() {
    let mut session = session_with(gradient(4, 4));
    for i in 0..30 {
        session.resize(4 + i, 4).unwrap();
        assert!(session.history().len() <= MAX_HISTORY_STEPS);
    }
    assert_eq!(session.history().len(), MAX_HISTORY_STEPS);
}

#[test]
fn new_edit_after_undo_discards_redo_branch() {
    let mut session = session_with(gradient(10, 10));
    session.resize(20, 20).unwrap();
    session.resize(30, 30).unwrap();
    assert_eq!(session.undo().unwrap(), Notice::Undone);
    assert!(session.history().can_redo());

    session.resize(5, 5).unwrap();
    assert!(!session.history().can_redo());
    assert_eq!(session.redo().unwrap(), Notice::NothingToRedo);
    assert_eq!(session.buffer().unwrap().dimensions(), (5, 5));
}

#[test]
fn undo_then_redo_is_byte_identical() {
    let mut session = session_with(gradient(12, 9));
    session
        .apply_color_op(Rgb::new(0, 0, 0), 40.0, ColorMode::Erase)
        .unwrap();
    let edited = raw(&session);

    session.undo().unwrap();
    assert_eq!(raw(&session), gradient(12, 9).into_raw());

    session.redo().unwrap();
    assert_eq!(raw(&session), edited);
}

#[test]
fn snapshots_do_not_follow_later_edits() {
    let mut session = session_with(RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255])));
    let before = raw(&session);
    session
        .apply_color_op(Rgb::new(9, 9, 9), 0.0, ColorMode::Replace(Rgb::new(1, 2, 3)))
        .unwrap();
    session
        .apply_color_op(Rgb::new(1, 2, 3), 0.0, ColorMode::Erase)
        .unwrap();

    session.undo().unwrap();
    session.undo().unwrap();
    assert_eq!(raw(&session), before);
}

#[test]
fn zero_tolerance_erases_only_exact_matches() {
    let mut image = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
    image.put_pixel(1, 0, Rgba([254, 0, 0, 255]));
    let mut session = session_with(image);

    let notice = session
        .apply_color_op(Rgb::new(255, 0, 0), 0.0, ColorMode::Erase)
        .unwrap();
    assert_eq!(
        notice,
        Notice::ColorApplied {
            mode: ColorMode::Erase,
            matched: 1
        }
    );
    assert_eq!(raw(&session), vec![255, 0, 0, 0, 254, 0, 0, 255]);
    assert!(session.show_checkerboard());
}

#[test]
fn replace_forces_full_alpha() {
    let mut session = session_with(RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40])));
    session
        .apply_color_op(Rgb::new(12, 20, 30), 2.0, ColorMode::Replace(Rgb::new(200, 100, 50)))
        .unwrap();
    for px in raw(&session).chunks_exact(4) {
        assert_eq!(px, [200, 100, 50, 255]);
    }
    assert!(!session.show_checkerboard());
}

#[test]
fn negative_tolerance_is_rejected_without_a_commit() {
    let mut session = session_with(gradient(4, 4));
    let err = session
        .apply_color_op(Rgb::new(0, 0, 0), -1.0, ColorMode::Erase)
        .unwrap_err();
    assert!(matches!(err, EditorError::InvalidTolerance(_)));
    assert_eq!(session.history().len(), 1);
}

#[test]
fn crop_must_fit_inside_the_buffer() {
    let mut session = session_with(gradient(100, 100));
    let err = session.crop(CropRegion::new(90, 90, 20, 20)).unwrap_err();
    assert!(matches!(err, EditorError::InvalidCropRegion { .. }));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.buffer().unwrap().dimensions(), (100, 100));

    let notice = session.crop(CropRegion::new(90, 90, 10, 10)).unwrap();
    assert_eq!(notice, Notice::Cropped { width: 10, height: 10 });
    assert_eq!(session.history().len(), 2);
}

#[test]
fn huge_crop_values_are_rejected_without_a_commit() {
    let mut session = session_with(gradient(100, 100));
    for region in [
        CropRegion::new(i64::MAX, 0, 1, 1),
        CropRegion::new(0, 0, 1, i64::MAX),
        CropRegion::new((1 << 32) + 10, 0, i64::MAX - 5, 1),
    ] {
        assert!(matches!(
            session.crop(region),
            Err(EditorError::InvalidCropRegion { .. })
        ));
    }
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.buffer().unwrap().dimensions(), (100, 100));
}

#[test]
fn crop_keeps_the_selected_pixels() {
    let mut session = session_with(gradient(20, 20));
    let expected = session.pick_color(5, 7).unwrap();
    session.crop(CropRegion::new(5, 7, 3, 3)).unwrap();
    assert_eq!(session.pick_color(0, 0).unwrap(), expected);
}

#[test]
fn invalid_resize_leaves_state_alone() {
    let mut session = session_with(gradient(6, 6));
    assert!(matches!(
        session.resize(0, 6),
        Err(EditorError::InvalidDimension(_))
    ));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.buffer().unwrap().dimensions(), (6, 6));
}

#[test]
fn linked_resize_uses_original_aspect() {
    let mut session = session_with(gradient(200, 100));
    assert_eq!(session.linked_height(50).unwrap(), 25);
    assert_eq!(session.linked_width(30).unwrap(), 60);
    session.resize_to_width(80).unwrap();
    assert_eq!(session.buffer().unwrap().dimensions(), (80, 40));
}

#[test]
fn reset_is_idempotent() {
    let mut session = session_with(gradient(16, 16));
    session.resize(8, 8).unwrap();
    session.crop(CropRegion::new(0, 0, 4, 4)).unwrap();

    session.reset_to_original().unwrap();
    let first = raw(&session);
    assert_eq!(session.history().len(), 1);

    session.reset_to_original().unwrap();
    assert_eq!(raw(&session), first);
    assert_eq!(session.history().len(), 1);
    assert_eq!(first, gradient(16, 16).into_raw());
}

#[test]
fn undo_at_the_oldest_snapshot_reports_nothing() {
    let mut session = session_with(gradient(4, 4));
    assert_eq!(session.undo().unwrap(), Notice::NothingToUndo);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn pick_color_maps_display_coordinates() {
    let mut image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
    image.put_pixel(9, 9, Rgba([1, 2, 3, 0]));
    let session = session_with(image);

    let picked = session.pick_color_scaled(199.0, 199.0, 200.0, 200.0).unwrap();
    assert_eq!(picked, Rgb::new(1, 2, 3));
    assert!(matches!(
        session.pick_color(10, 0),
        Err(EditorError::OutOfBounds { .. })
    ));
    assert!(session.pick_color(-1, 0).is_err());
}

#[test]
fn dropped_non_image_is_rejected() {
    let mut session = EditorSession::default();
    let err = session
        .load_bytes(b"hello", Some("text/plain"), "notes.txt")
        .unwrap_err();
    assert!(matches!(err, EditorError::UnsupportedDropType(_)));
    assert!(!session.is_loaded());
}

#[test]
fn dropped_jpeg_hides_the_checkerboard() {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(gradient(5, 5))
        .to_rgb8()
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .unwrap();

    let mut session = EditorSession::default();
    let notice = session
        .load_bytes(&bytes, Some("image/jpeg"), "photo.jpg")
        .unwrap();
    assert_eq!(notice, Notice::Loaded { width: 5, height: 5 });
    assert_eq!(session.source_format(), SourceFormat::Jpeg);
    assert!(!session.show_checkerboard());
    assert_eq!(session.name(), "photo.jpg");
}

#[test]
fn loading_again_replaces_history() {
    let mut session = session_with(gradient(4, 4));
    session.resize(2, 2).unwrap();
    session
        .load_image(gradient(3, 3), SourceFormat::Jpeg, "other.jpg")
        .unwrap();
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.original_dimensions().unwrap(), (3, 3));
    assert!(!session.show_checkerboard());
}
