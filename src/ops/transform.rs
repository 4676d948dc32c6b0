// ============================================================================
// TRANSFORM OPERATIONS — resize, crop, and the aspect-lock / scaling helpers
// ============================================================================

use std::str::FromStr;

use image::imageops;
use serde::{Deserialize, Serialize};

use crate::canvas::{CropRegion, PixelBuffer};
use crate::error::{EditorError, Result};

/// Interpolation method for resize operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl Interpolation {
    pub fn label(&self) -> &'static str {
        match self {
            Interpolation::Nearest  => "Nearest Neighbor",
            Interpolation::Bilinear => "Bilinear",
            Interpolation::Bicubic  => "Bicubic",
            Interpolation::Lanczos3 => "Lanczos3",
        }
    }

    pub fn all() -> &'static [Interpolation] {
        &[
            Interpolation::Nearest,
            Interpolation::Bilinear,
            Interpolation::Bicubic,
            Interpolation::Lanczos3,
        ]
    }

    pub fn to_filter(&self) -> imageops::FilterType {
        match self {
            Interpolation::Nearest  => imageops::FilterType::Nearest,
            Interpolation::Bilinear => imageops::FilterType::Triangle,
            Interpolation::Bicubic  => imageops::FilterType::CatmullRom,
            Interpolation::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest"             => Ok(Interpolation::Nearest),
            "bilinear" | "linear" => Ok(Interpolation::Bilinear),
            "bicubic" | "cubic"   => Ok(Interpolation::Bicubic),
            "lanczos3" | "lanczos" => Ok(Interpolation::Lanczos3),
            other => Err(format!("unknown interpolation '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
//  Whole-buffer transforms (each returns a brand-new buffer)
// ---------------------------------------------------------------------------

/// Resample `buffer` to `new_w × new_h`. Both must be non-zero.
pub fn resize_buffer(
    buffer: &PixelBuffer,
    new_w: u32,
    new_h: u32,
    interp: Interpolation,
) -> Result<PixelBuffer> {
    if new_w == 0 || new_h == 0 {
        return Err(EditorError::InvalidDimension(format!("{}×{}", new_w, new_h)));
    }
    let resized = imageops::resize(buffer.as_rgba_image(), new_w, new_h, interp.to_filter());
    PixelBuffer::from_rgba_image(resized)
}

/// Copy the sub-rectangle described by `region` into a new buffer.
pub fn crop_buffer(buffer: &PixelBuffer, region: &CropRegion) -> Result<PixelBuffer> {
    let (x, y, w, h) = region.validate(buffer.width(), buffer.height())?;
    let cropped = imageops::crop_imm(buffer.as_rgba_image(), x, y, w, h).to_image();
    PixelBuffer::from_rgba_image(cropped)
}

// ---------------------------------------------------------------------------
//  Helpers for resize / crop / pick front-ends
// ---------------------------------------------------------------------------

/// Height that keeps `orig_w:orig_h` for a new `width`.
pub fn linked_height(width: u32, orig_w: u32, orig_h: u32) -> u32 {
    let ratio = orig_w as f64 / orig_h as f64;
    (width as f64 / ratio).round() as u32
}

/// Width that keeps `orig_w:orig_h` for a new `height`.
pub fn linked_width(height: u32, orig_w: u32, orig_h: u32) -> u32 {
    let ratio = orig_w as f64 / orig_h as f64;
    (height as f64 * ratio).round() as u32
}

/// Parse a typed-in width or height. Non-numeric and non-positive values are
/// rejected with `InvalidDimension`.
pub fn parse_dimension(s: &str) -> Result<u32> {
    let invalid = || EditorError::InvalidDimension(s.trim().to_string());
    let value: i64 = s.trim().parse().map_err(|_| invalid())?;
    if value <= 0 {
        return Err(invalid());
    }
    u32::try_from(value).map_err(|_| invalid())
}

/// Map a position on a scaled display of the buffer to buffer coordinates,
/// truncating toward zero (the pixel under the pointer).
pub fn display_to_buffer(
    display_x: f64,
    display_y: f64,
    display_w: f64,
    display_h: f64,
    buffer_w: u32,
    buffer_h: u32,
) -> (i64, i64) {
    let scale_x = buffer_w as f64 / display_w;
    let scale_y = buffer_h as f64 / display_h;
    (
        (display_x * scale_x).floor() as i64,
        (display_y * scale_y).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn resize_produces_requested_dimensions() {
        let buf = PixelBuffer::filled(40, 30, Rgba([1, 2, 3, 255])).unwrap();
        for interp in Interpolation::all() {
            let out = resize_buffer(&buf, 13, 77, *interp).unwrap();
            assert_eq!(out.dimensions(), (13, 77));
            assert_eq!(out.as_raw().len(), 13 * 77 * 4);
        }
        assert!(resize_buffer(&buf, 0, 10, Interpolation::Bilinear).is_err());
    }

    #[test]
    fn crop_extracts_sub_rectangle() {
        let mut buf = PixelBuffer::new(100, 100).unwrap();
        buf.put_pixel(90, 90, Rgba([9, 9, 9, 255]));
        buf.put_pixel(99, 99, Rgba([1, 1, 1, 255]));

        let out = crop_buffer(&buf, &CropRegion::new(90, 90, 10, 10)).unwrap();
        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(out.pixel(0, 0), Some(Rgba([9, 9, 9, 255])));
        assert_eq!(out.pixel(9, 9), Some(Rgba([1, 1, 1, 255])));

        assert!(matches!(
            crop_buffer(&buf, &CropRegion::new(90, 90, 20, 20)),
            Err(EditorError::InvalidCropRegion { .. })
        ));
    }

    #[test]
    fn aspect_lock_uses_given_ratio() {
        assert_eq!(linked_height(400, 1920, 1080), 225);
        assert_eq!(linked_width(225, 1920, 1080), 400);
        // 3:2 — 101 / 1.5 = 67.33
        assert_eq!(linked_height(101, 300, 200), 67);
    }

    #[test]
    fn dimension_parsing() {
        assert_eq!(parse_dimension(" 640 ").unwrap(), 640);
        assert!(parse_dimension("0").is_err());
        assert!(parse_dimension("-5").is_err());
        assert!(parse_dimension("wide").is_err());
    }

    #[test]
    fn display_coordinates_scale_down() {
        // 1000×500 buffer displayed at 500×250
        assert_eq!(display_to_buffer(10.7, 3.2, 500.0, 250.0, 1000, 500), (21, 6));
    }

    #[test]
    fn interpolation_names_parse() {
        assert_eq!("Lanczos".parse::<Interpolation>(), Ok(Interpolation::Lanczos3));
        assert!("smooth".parse::<Interpolation>().is_err());
    }
}
