use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, ImageFormat};

use crate::canvas::PixelBuffer;
use crate::error::{EditorError, Result};

// ============================================================================
// SOURCE FORMAT — declared type of a loaded image
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
    Bmp,
    #[default]
    Other,
}

impl SourceFormat {
    /// From a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_lowercase().as_str() {
            "image/png"                => SourceFormat::Png,
            "image/jpeg" | "image/jpg" => SourceFormat::Jpeg,
            "image/webp"               => SourceFormat::Webp,
            "image/gif"                => SourceFormat::Gif,
            "image/bmp"                => SourceFormat::Bmp,
            _                          => SourceFormat::Other,
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png"          => SourceFormat::Png,
            "jpg" | "jpeg" => SourceFormat::Jpeg,
            "webp"         => SourceFormat::Webp,
            "gif"          => SourceFormat::Gif,
            "bmp"          => SourceFormat::Bmp,
            _              => SourceFormat::Other,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png  => SourceFormat::Png,
            ImageFormat::Jpeg => SourceFormat::Jpeg,
            ImageFormat::WebP => SourceFormat::Webp,
            ImageFormat::Gif  => SourceFormat::Gif,
            ImageFormat::Bmp  => SourceFormat::Bmp,
            _                 => SourceFormat::Other,
        }
    }
}

/// Whether images of this type usually carry transparency, so a front-end
/// should draw a checkerboard behind them.
pub fn has_alpha_channel_hint(format: SourceFormat) -> bool {
    matches!(format, SourceFormat::Png | SourceFormat::Webp)
}

/// Reject dropped files whose MIME type is not an image.
pub fn check_drop_type(mime: &str) -> Result<()> {
    if mime.trim().to_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(EditorError::UnsupportedDropType(mime.to_string()))
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode encoded image bytes into a buffer at the image's natural size.
///
/// `declared` wins over content sniffing for the returned [`SourceFormat`],
/// the same way a browser trusts a file's declared type.
pub fn decode_image(bytes: &[u8], declared: Option<SourceFormat>) -> Result<(PixelBuffer, SourceFormat)> {
    let sniffed = image::guess_format(bytes).ok();
    let img = match sniffed {
        Some(fmt) => image::load_from_memory_with_format(bytes, fmt)?,
        None => image::load_from_memory(bytes)?,
    };
    let format = declared
        .filter(|f| *f != SourceFormat::Other)
        .or_else(|| sniffed.map(SourceFormat::from_image_format))
        .unwrap_or_default();
    let buffer = PixelBuffer::from_rgba_image(img.to_rgba8())?;
    Ok((buffer, format))
}

/// Synchronously load an image file. The format is taken from the extension,
/// falling back to the file contents.
pub fn load_image_sync(path: &Path) -> Result<(PixelBuffer, SourceFormat)> {
    let bytes = std::fs::read(path)?;
    let declared = path
        .extension()
        .and_then(|e| e.to_str())
        .map(SourceFormat::from_extension);
    decode_image(&bytes, declared)
}

// ============================================================================
// EXPORT FORMATS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl RasterFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png  => "png",
            RasterFormat::Jpeg => "jpeg",
            RasterFormat::Webp => "webp",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            RasterFormat::Png  => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
            RasterFormat::Webp => "image/webp",
        }
    }

    pub fn supports_quality(&self) -> bool {
        matches!(self, RasterFormat::Jpeg)
    }
}

impl FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches("image/") {
            "png"          => Ok(RasterFormat::Png),
            "jpeg" | "jpg" => Ok(RasterFormat::Jpeg),
            "webp"         => Ok(RasterFormat::Webp),
            other => Err(format!("unsupported raster format '{}'", other)),
        }
    }
}

/// Everything the editor can write out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Raster(RasterFormat),
    Svg,
    Pdf,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Raster(RasterFormat::Png)
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Raster(r) => r.extension(),
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// An explicit format wins; otherwise the output path's extension, and
    /// PNG when that is missing or unrecognised.
    pub fn infer(explicit: Option<ExportFormat>, output: Option<&Path>) -> Self {
        if let Some(f) = explicit {
            return f;
        }
        output
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => other.parse().map(ExportFormat::Raster),
        }
    }
}

/// `<name>.<ext>`, with `fallback` when the name is missing or blank.
pub fn export_file_name(name: Option<&str>, fallback: &str, extension: &str) -> String {
    let stem = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(fallback);
    format!("{}.{}", stem, extension)
}

// ============================================================================
// RASTER ENCODING
// ============================================================================

/// Encode the buffer as PNG, JPEG or WebP.
///
/// `quality` (0.0–1.0) only affects JPEG. JPEG drops alpha. WebP is written
/// losslessly. An encoder error or an empty result is reported as
/// `EncodingFailed`.
pub fn encode_raster(buffer: &PixelBuffer, format: RasterFormat, quality: f32) -> Result<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    let (w, h) = buffer.dimensions();
    let fail = |e: image::ImageError| EditorError::encoding(format.extension(), e);

    match format {
        RasterFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(buffer.as_raw(), w, h, ColorType::Rgba8)
                .map_err(fail)?;
        }
        RasterFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(buffer.as_rgba_image().clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality))
                .encode(rgb.as_raw(), w, h, ColorType::Rgb8)
                .map_err(fail)?;
        }
        RasterFormat::Webp => {
            let dyn_img = DynamicImage::ImageRgba8(buffer.as_rgba_image().clone());
            dyn_img
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::WebP)
                .map_err(fail)?;
        }
    }

    if bytes.is_empty() {
        return Err(EditorError::encoding(format.extension(), "encoder produced no data"));
    }
    Ok(bytes)
}

/// Map a 0.0–1.0 quality factor onto the JPEG encoder's 1–100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 92;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Write encoded bytes to `path`, creating or truncating it.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
