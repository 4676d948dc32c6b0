// ============================================================================
// PIXEL BUFFER — the single RGBA canvas an editor session works on
// ============================================================================

use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// A mutable, non-empty grid of RGBA8 pixels.
///
/// The raw data length is always `width * height * 4`; every constructor
/// checks it, so the rest of the crate can index without re-validating.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, Rgba([0, 0, 0, 0]))
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, color),
        })
    }

    /// Wrap raw RGBA bytes. Fails unless `pixels.len() == width * height * 4`.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(pixels.len()) {
            return Err(EditorError::InvalidDimension(format!(
                "{}×{} needs {} bytes, got {}",
                width,
                height,
                expected.map_or_else(|| "too many".to_string(), |n| n.to_string()),
                pixels.len()
            )));
        }
        let image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            EditorError::InvalidDimension(format!("{}×{}", width, height))
        })?;
        Ok(Self { image })
    }

    pub fn from_rgba_image(image: RgbaImage) -> Result<Self> {
        check_dimensions(image.width(), image.height())?;
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Mutable raw RGBA bytes. The length cannot change through a slice, so
    /// the size invariant survives any edit made here.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.image.put_pixel(x, y, color);
        }
    }

    /// RGB at a signed coordinate; alpha is dropped.
    pub fn color_at(&self, x: i64, y: i64) -> Result<Rgb> {
        let out_of_bounds = || EditorError::OutOfBounds {
            x,
            y,
            width: self.width(),
            height: self.height(),
        };
        let ux = u32::try_from(x).map_err(|_| out_of_bounds())?;
        let uy = u32::try_from(y).map_err(|_| out_of_bounds())?;
        let p = self.pixel(ux, uy).ok_or_else(out_of_bounds)?;
        Ok(Rgb::new(p[0], p[1], p[2]))
    }

    pub fn memory_bytes(&self) -> usize {
        self.image.as_raw().len()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EditorError::InvalidDimension(format!("{}×{}", width, height)));
    }
    Ok(())
}

// ============================================================================
// RGB COLOR
// ============================================================================

/// An opaque RGB triple, written and parsed as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the `#` is optional, hex digits are case-insensitive).
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EditorError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| EditorError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lower-case `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

// ============================================================================
// CROP REGION
// ============================================================================

/// A crop rectangle in buffer pixels.
///
/// Fields are signed so that whatever a UI hands over (negative offsets from
/// a dragged box, zero extents) can be represented and then rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRegion {
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// Check the region against a buffer and return it as unsigned
    /// `(x, y, width, height)`.
    pub fn validate(&self, buffer_width: u32, buffer_height: u32) -> Result<(u32, u32, u32, u32)> {
        let reject = || EditorError::InvalidCropRegion {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            buffer_width,
            buffer_height,
        };
        // Extents come straight from user input, so the far edge is computed
        // without wrapping.
        let fits = |offset: i64, extent: i64, limit: u32| {
            offset >= 0
                && extent > 0
                && offset
                    .checked_add(extent)
                    .is_some_and(|end| end <= i64::from(limit))
        };
        if !fits(self.x, self.width, buffer_width) || !fits(self.y, self.height, buffer_height) {
            return Err(reject());
        }
        let to_u32 = |v: i64| u32::try_from(v).map_err(|_| reject());
        Ok((
            to_u32(self.x)?,
            to_u32(self.y)?,
            to_u32(self.width)?,
            to_u32(self.height)?,
        ))
    }

    /// Map a crop box drawn over a scaled display of the buffer back to
    /// buffer pixels, rounding each edge independently.
    pub fn from_display_box(
        left: f64,
        top: f64,
        box_width: f64,
        box_height: f64,
        display_width: f64,
        display_height: f64,
        buffer_width: u32,
        buffer_height: u32,
    ) -> Self {
        let scale_x = buffer_width as f64 / display_width;
        let scale_y = buffer_height as f64 / display_height;
        Self {
            x: (left * scale_x).round() as i64,
            y: (top * scale_y).round() as i64,
            width: (box_width * scale_x).round() as i64,
            height: (box_height * scale_y).round() as i64,
        }
    }

    /// Pull typed-in values back inside the buffer, keeping at least one
    /// pixel of extent. Used by crop-box editors before drawing the box.
    pub fn clamped_to(&self, buffer_width: u32, buffer_height: u32) -> Self {
        let bw = buffer_width as i64;
        let bh = buffer_height as i64;
        let x = self.x.min(bw - if self.width > 0 { self.width } else { 1 }).max(0);
        let y = self.y.min(bh - if self.height > 0 { self.height } else { 1 }).max(0);
        Self {
            x,
            y,
            width: self.width.min(bw - x).max(1),
            height: self.height.min(bh - y).max(1),
        }
    }
}
