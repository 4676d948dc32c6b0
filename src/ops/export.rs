// ============================================================================
// EXPORT — pixel-rect SVG dump and single-page PDF
// ============================================================================

use std::fmt::Write as _;
use std::io::BufWriter;

use image::{DynamicImage, RgbImage};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use serde::{Deserialize, Serialize};

use crate::canvas::PixelBuffer;
use crate::error::{EditorError, Result};

const MM_PER_INCH: f32 = 25.4;
/// Resolution the embedded image is declared at before scaling to the page.
const PDF_IMAGE_DPI: f32 = 300.0;

// ---------------------------------------------------------------------------
//  SVG
// ---------------------------------------------------------------------------

/// One 1×1 `<rect>` per pixel with non-zero alpha, row-major, filled with the
/// pixel's RGB. Fully transparent pixels produce nothing. This is a literal
/// pixel dump, not vectorization; output grows with the image area.
pub fn render_svg(buffer: &PixelBuffer) -> String {
    let (w, h) = buffer.dimensions();
    let opaque = buffer.as_raw().chunks_exact(4).filter(|p| p[3] > 0).count();
    let mut svg = String::with_capacity(96 + opaque * 64);

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        w, h
    );
    for (i, p) in buffer.as_raw().chunks_exact(4).enumerate() {
        if p[3] == 0 {
            continue;
        }
        let x = i as u32 % w;
        let y = i as u32 / w;
        let _ = write!(
            svg,
            r##"<rect x="{}" y="{}" width="1" height="1" fill="#{:02x}{:02x}{:02x}" />"##,
            x, y, p[0], p[1], p[2]
        );
    }
    svg.push_str("</svg>");
    svg
}

// ---------------------------------------------------------------------------
//  PDF
// ---------------------------------------------------------------------------

/// Page geometry for PDF export, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
}

impl Default for PdfLayout {
    /// A4 portrait with a 10 mm margin.
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
        }
    }
}

/// Where the image lands on the page. `y_mm` is measured from the top edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PdfLayout {
    /// Fill the usable width, shrink to the usable height if needed, keep the
    /// aspect ratio, and center on the page.
    pub fn fit(&self, image_w: u32, image_h: u32) -> Placement {
        let aspect = image_w as f32 / image_h as f32;
        let usable_w = self.page_width_mm - 2.0 * self.margin_mm;
        let usable_h = self.page_height_mm - 2.0 * self.margin_mm;

        let mut width_mm = usable_w;
        let mut height_mm = width_mm / aspect;
        if height_mm > usable_h {
            height_mm = usable_h;
            width_mm = height_mm * aspect;
        }
        Placement {
            x_mm: (self.page_width_mm - width_mm) / 2.0,
            y_mm: (self.page_height_mm - height_mm) / 2.0,
            width_mm,
            height_mm,
        }
    }
}

/// Render the buffer onto a single page.
///
/// The image is flattened over white and embedded as RGB, so transparency
/// does not survive into the PDF; on a white page it renders the same.
pub fn render_pdf(buffer: &PixelBuffer, layout: &PdfLayout, title: &str) -> Result<Vec<u8>> {
    let placement = layout.fit(buffer.width(), buffer.height());
    let (doc, page, layer) = PdfDocument::new(
        title,
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        "Image",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let native_w_mm = buffer.width() as f32 * MM_PER_INCH / PDF_IMAGE_DPI;
    let native_h_mm = buffer.height() as f32 * MM_PER_INCH / PDF_IMAGE_DPI;

    let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(flatten_on_white(buffer)));
    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(placement.x_mm)),
            // PDF space grows upward from the bottom edge
            translate_y: Some(Mm(layout.page_height_mm - placement.y_mm - placement.height_mm)),
            scale_x: Some(placement.width_mm / native_w_mm),
            scale_y: Some(placement.height_mm / native_h_mm),
            dpi: Some(PDF_IMAGE_DPI),
            ..Default::default()
        },
    );

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| EditorError::Pdf(format!("{:?}", e)))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| EditorError::Pdf(e.to_string()))?;
    if bytes.is_empty() {
        return Err(EditorError::encoding("pdf", "document writer produced no data"));
    }
    Ok(bytes)
}

/// Composite every pixel over opaque white.
fn flatten_on_white(buffer: &PixelBuffer) -> RgbImage {
    let (w, h) = buffer.dimensions();
    let mut raw = Vec::with_capacity(buffer.pixel_count() * 3);
    for p in buffer.as_raw().chunks_exact(4) {
        let a = p[3] as u32;
        for c in &p[..3] {
            raw.push(((*c as u32 * a + 255 * (255 - a) + 127) / 255) as u8);
        }
    }
    // Length is exactly w*h*3 by construction
    RgbImage::from_raw(w, h, raw).unwrap_or_else(|| RgbImage::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn svg_omits_transparent_pixels() {
        let mut buf = PixelBuffer::new(2, 1).unwrap();
        buf.put_pixel(1, 0, Rgba([255, 16, 0, 255]));
        let svg = render_svg(&buf);
        assert_eq!(svg.matches("<rect").count(), 1);
        assert_eq!(
            svg,
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="1"><rect x="1" y="0" width="1" height="1" fill="#ff1000" /></svg>"##
        );
    }

    #[test]
    fn svg_ignores_alpha_in_fill() {
        let buf = PixelBuffer::filled(2, 2, Rgba([1, 2, 3, 1])).unwrap();
        let svg = render_svg(&buf);
        assert_eq!(svg.matches(r##"fill="#010203""##).count(), 4);
        assert!(svg.contains(r#"<rect x="1" y="1""#));
    }

    #[test]
    fn wide_image_fills_usable_width() {
        let p = PdfLayout::default().fit(400, 200);
        assert_eq!(p.width_mm, 190.0);
        assert_eq!(p.height_mm, 95.0);
        assert_eq!(p.x_mm, 10.0);
        assert_eq!(p.y_mm, 101.0);
    }

    #[test]
    fn tall_image_is_limited_by_height() {
        let p = PdfLayout::default().fit(100, 1000);
        assert_eq!(p.height_mm, 277.0);
        assert!((p.width_mm - 27.7).abs() < 1e-4);
        assert_eq!(p.y_mm, 10.0);
        assert!((p.x_mm - (210.0 - p.width_mm) / 2.0).abs() < 1e-4);
    }

    #[test]
    fn flatten_blends_toward_white() {
        let mut buf = PixelBuffer::new(2, 1).unwrap();
        buf.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        let flat = flatten_on_white(&buf);
        assert_eq!(flat.as_raw(), &[0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn pdf_has_header() {
        let buf = PixelBuffer::filled(4, 3, Rgba([20, 40, 60, 255])).unwrap();
        let bytes = render_pdf(&buf, &PdfLayout::default(), "test").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
