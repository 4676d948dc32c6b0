use image::{Rgba, RgbaImage};

use snapedit::{EditorSession, ExportFormat, RasterFormat, SourceFormat};

fn session_with(image: RgbaImage) -> EditorSession {
    let mut session = EditorSession::default();
    session.load_image(image, SourceFormat::Png, "test.png").unwrap();
    session
}

#[test]
fn svg_has_one_rect_per_visible_pixel() {
    let mut image = RgbaImage::new(2, 2);
    image.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
    let session = session_with(image);

    let svg = session.export_svg().unwrap();
    assert_eq!(svg.matches("<rect").count(), 1);
    assert!(svg.contains(r##"<rect x="1" y="0" width="1" height="1" fill="#ff0000" />"##));
    assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2">"#));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn png_export_decodes_to_the_same_pixels() {
    let image = RgbaImage::from_fn(7, 3, |x, y| Rgba([x as u8 * 30, y as u8 * 60, 5, (x * 36) as u8]));
    let session = session_with(image.clone());

    let bytes = session.export_raster(RasterFormat::Png, 0.92).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded, image);
}

#[test]
fn jpeg_and_webp_exports_are_non_empty() {
    let session = session_with(RgbaImage::from_pixel(8, 8, Rgba([40, 80, 120, 255])));

    let jpeg = session.export_raster(RasterFormat::Jpeg, 0.5).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let webp = session.export_raster(RasterFormat::Webp, 0.92).unwrap();
    assert_eq!(&webp[..4], b"RIFF");
    assert_eq!(&webp[8..12], b"WEBP");
}

#[test]
fn save_into_uses_default_names() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_with(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));

    session
        .save_into(dir.path(), None, ExportFormat::default(), 0.92)
        .unwrap();
    session
        .save_into(dir.path(), Some("  "), ExportFormat::Svg, 0.92)
        .unwrap();
    session
        .save_into(dir.path(), None, ExportFormat::Pdf, 0.92)
        .unwrap();

    assert!(dir.path().join("image.png").is_file());
    assert!(dir.path().join("image.svg").is_file());
    let pdf = std::fs::read(dir.path().join("download.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn save_to_writes_the_requested_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jpeg");
    let session = session_with(RgbaImage::from_pixel(3, 3, Rgba([200, 10, 10, 255])));

    session
        .save_to(&path, ExportFormat::Raster(RasterFormat::Jpeg), 0.8)
        .unwrap();
    let reloaded = image::open(&path).unwrap();
    assert_eq!((reloaded.width(), reloaded.height()), (3, 3));
}

#[test]
fn load_path_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.png");
    RgbaImage::from_pixel(5, 4, Rgba([9, 8, 7, 128]))
        .save(&path)
        .unwrap();

    let mut session = EditorSession::default();
    session.load_path(&path).unwrap();
    assert_eq!(session.name(), "source.png");
    assert_eq!(session.source_format(), SourceFormat::Png);
    assert_eq!(session.buffer().unwrap().dimensions(), (5, 4));
}
