use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use uuid::Uuid;

use crate::canvas::{CropRegion, PixelBuffer, Rgb};
use crate::components::history::{HistoryManager, Snapshot};
use crate::error::{EditorError, Result};
use crate::io::{self, ExportFormat, RasterFormat, SourceFormat};
use crate::ops::color_removal::{self, ColorMode};
use crate::ops::export;
use crate::ops::transform;
use crate::settings::Settings;

/// Informational outcome of a session operation, shown to the user.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Loaded { width: u32, height: u32 },
    Resized { width: u32, height: u32 },
    Cropped { width: u32, height: u32 },
    ColorApplied { mode: ColorMode, matched: usize },
    Reset { width: u32, height: u32 },
    Undone,
    Redone,
    NothingToUndo,
    NothingToRedo,
    ColorPicked(Rgb),
    Exported { format: ExportFormat, path: PathBuf },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Loaded { width, height } => {
                write!(f, "Image loaded successfully! ({}×{})", width, height)
            }
            Notice::Resized { width, height } => {
                write!(f, "Image resized successfully! ({}×{})", width, height)
            }
            Notice::Cropped { width, height } => {
                write!(f, "Image cropped successfully! ({}×{})", width, height)
            }
            Notice::ColorApplied { matched, .. } => {
                write!(f, "Color operation applied successfully! ({} pixels)", matched)
            }
            Notice::Reset { .. } => f.write_str("Image reset to original."),
            Notice::Undone => f.write_str("Undo successful."),
            Notice::Redone => f.write_str("Redo successful."),
            Notice::NothingToUndo => f.write_str("Nothing to undo."),
            Notice::NothingToRedo => f.write_str("Nothing to redo."),
            Notice::ColorPicked(c) => write!(f, "Color picked: {}", c),
            Notice::Exported { format: ExportFormat::Svg, path } => write!(
                f,
                "SVG file generated: {}. Note: The file may be large and is a pixel-based representation.",
                path.display()
            ),
            Notice::Exported { path, .. } => {
                write!(f, "Image exported successfully! ({})", path.display())
            }
        }
    }
}

/// One editing session over a single image.
///
/// Owns the live pixel buffer, the bounded undo history, and the snapshot
/// taken at load time. Starts empty; every editing call fails with
/// `NoImageLoaded` until an image is loaded.
pub struct EditorSession {
    pub id: Uuid,
    /// Display name (file name, or "Untitled").
    name: String,
    settings: Settings,
    buffer: Option<PixelBuffer>,
    history: HistoryManager,
    original: Option<Snapshot>,
    source_format: SourceFormat,
    show_checkerboard: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl EditorSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Untitled".to_string(),
            settings,
            buffer: None,
            history: HistoryManager::new(),
            original: None,
            source_format: SourceFormat::Other,
            show_checkerboard: false,
        }
    }

    // ------------------------------------------------------------------
    //  Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Result<&PixelBuffer> {
        self.buffer.as_ref().ok_or(EditorError::NoImageLoaded)
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn source_format(&self) -> SourceFormat {
        self.source_format
    }

    /// Whether a front-end should draw a transparency checkerboard.
    pub fn show_checkerboard(&self) -> bool {
        self.show_checkerboard
    }

    /// Dimensions of the image as loaded, before any edits.
    pub fn original_dimensions(&self) -> Result<(u32, u32)> {
        self.original
            .as_ref()
            .map(|s| s.buffer().dimensions())
            .ok_or(EditorError::NoImageLoaded)
    }

    // ------------------------------------------------------------------
    //  Loading
    // ------------------------------------------------------------------

    /// Start over with `image` as the only state.
    pub fn load_image(
        &mut self,
        image: RgbaImage,
        source_format: SourceFormat,
        name: impl Into<String>,
    ) -> Result<Notice> {
        let buffer = PixelBuffer::from_rgba_image(image)?;
        Ok(self.install(buffer, source_format, name.into()))
    }

    pub fn load_path(&mut self, path: &Path) -> Result<Notice> {
        let (buffer, format) = io::load_image_sync(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        Ok(self.install(buffer, format, name))
    }

    /// Load dropped or uploaded bytes. When a MIME type is given it must be
    /// an image type, and it decides the checkerboard hint.
    pub fn load_bytes(&mut self, bytes: &[u8], mime: Option<&str>, name: &str) -> Result<Notice> {
        if let Some(m) = mime {
            io::check_drop_type(m)?;
        }
        let declared = mime.map(SourceFormat::from_mime);
        let (buffer, format) = io::decode_image(bytes, declared)?;
        Ok(self.install(buffer, format, name.to_string()))
    }

    fn install(&mut self, buffer: PixelBuffer, format: SourceFormat, name: String) -> Notice {
        let (width, height) = buffer.dimensions();
        tracing::info!(session = %self.id, %name, width, height, ?format, "image loaded");

        self.name = name;
        self.source_format = format;
        self.show_checkerboard = io::has_alpha_channel_hint(format);
        self.history.reset();
        self.history.commit("Open Image", &buffer);
        self.original = Some(Snapshot::capture("Original", &buffer));
        self.buffer = Some(buffer);
        Notice::Loaded { width, height }
    }

    // ------------------------------------------------------------------
    //  Mutating operations (each commits exactly once on success)
    // ------------------------------------------------------------------

    /// Resample to `width × height` with the configured interpolation.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Notice> {
        let current = self.buffer()?;
        let resized = transform::resize_buffer(current, width, height, self.settings.interpolation)?;
        self.replace_and_commit(resized, format!("Resize {}×{}", width, height));
        Ok(Notice::Resized { width, height })
    }

    /// Height matching `width` at the original image's aspect ratio.
    pub fn linked_height(&self, width: u32) -> Result<u32> {
        let (ow, oh) = self.original_dimensions()?;
        Ok(transform::linked_height(width, ow, oh))
    }

    /// Width matching `height` at the original image's aspect ratio.
    pub fn linked_width(&self, height: u32) -> Result<u32> {
        let (ow, oh) = self.original_dimensions()?;
        Ok(transform::linked_width(height, ow, oh))
    }

    /// Aspect-locked resize driven by a new width.
    pub fn resize_to_width(&mut self, width: u32) -> Result<Notice> {
        let height = self.linked_height(width)?;
        self.resize(width, height)
    }

    /// Aspect-locked resize driven by a new height.
    pub fn resize_to_height(&mut self, height: u32) -> Result<Notice> {
        let width = self.linked_width(height)?;
        self.resize(width, height)
    }

    pub fn crop(&mut self, region: CropRegion) -> Result<Notice> {
        let current = self.buffer()?;
        let cropped = transform::crop_buffer(current, &region)?;
        let (width, height) = cropped.dimensions();
        self.replace_and_commit(cropped, format!("Crop {}×{}", width, height));
        Ok(Notice::Cropped { width, height })
    }

    /// Remove (to transparent) or replace every pixel within `tolerance` of
    /// `target`.
    pub fn apply_color_op(&mut self, target: Rgb, tolerance: f64, mode: ColorMode) -> Result<Notice> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Err(EditorError::NoImageLoaded);
        };
        if !(tolerance >= 0.0) {
            return Err(EditorError::InvalidTolerance(tolerance));
        }
        let matched = color_removal::apply_color_distance(buffer, target, tolerance, mode);
        tracing::info!(session = %self.id, color = %target, tolerance, ?mode, matched, "color operation");

        self.commit(format!("{} {}", mode.label(), target));
        self.show_checkerboard = matches!(mode, ColorMode::Erase);
        Ok(Notice::ColorApplied { mode, matched })
    }

    /// Throw away every edit and start again from the loaded image.
    pub fn reset_to_original(&mut self) -> Result<Notice> {
        let original = self.original.as_ref().ok_or(EditorError::NoImageLoaded)?;
        let buffer = original.restore();
        let (width, height) = buffer.dimensions();

        self.history.reset();
        self.history.commit("Open Image", &buffer);
        self.buffer = Some(buffer);
        self.show_checkerboard = io::has_alpha_channel_hint(self.source_format);
        tracing::info!(session = %self.id, width, height, "reset to original");
        Ok(Notice::Reset { width, height })
    }

    pub fn undo(&mut self) -> Result<Notice> {
        if !self.is_loaded() {
            return Err(EditorError::NoImageLoaded);
        }
        match self.history.undo() {
            Some(snapshot) => {
                self.buffer = Some(snapshot.restore());
                Ok(Notice::Undone)
            }
            None => Ok(Notice::NothingToUndo),
        }
    }

    pub fn redo(&mut self) -> Result<Notice> {
        if !self.is_loaded() {
            return Err(EditorError::NoImageLoaded);
        }
        match self.history.redo() {
            Some(snapshot) => {
                self.buffer = Some(snapshot.restore());
                Ok(Notice::Redone)
            }
            None => Ok(Notice::NothingToRedo),
        }
    }

    fn replace_and_commit(&mut self, buffer: PixelBuffer, description: String) {
        self.buffer = Some(buffer);
        self.commit(description);
    }

    fn commit(&mut self, description: String) {
        if let Some(buffer) = &self.buffer {
            tracing::info!(session = %self.id, %description, width = buffer.width(), height = buffer.height(), "commit");
            self.history.commit(description, buffer);
        }
    }

    // ------------------------------------------------------------------
    //  Read-only operations
    // ------------------------------------------------------------------

    /// RGB of the pixel at buffer coordinates; alpha is ignored.
    pub fn pick_color(&self, x: i64, y: i64) -> Result<Rgb> {
        self.buffer()?.color_at(x, y)
    }

    /// Pick through a scaled display: `(display_x, display_y)` is a position
    /// on a `display_w × display_h` rendering of the buffer.
    pub fn pick_color_scaled(
        &self,
        display_x: f64,
        display_y: f64,
        display_w: f64,
        display_h: f64,
    ) -> Result<Rgb> {
        let buffer = self.buffer()?;
        let (x, y) = transform::display_to_buffer(
            display_x,
            display_y,
            display_w,
            display_h,
            buffer.width(),
            buffer.height(),
        );
        buffer.color_at(x, y)
    }

    // ------------------------------------------------------------------
    //  Export
    // ------------------------------------------------------------------

    pub fn export_raster(&self, format: RasterFormat, quality: f32) -> Result<Vec<u8>> {
        io::encode_raster(self.buffer()?, format, quality)
    }

    pub fn export_svg(&self) -> Result<String> {
        Ok(export::render_svg(self.buffer()?))
    }

    pub fn export_pdf(&self) -> Result<Vec<u8>> {
        export::render_pdf(self.buffer()?, &self.settings.pdf, &self.name)
    }

    /// Encode in `format` and write to `path`.
    pub fn save_to(&self, path: &Path, format: ExportFormat, quality: f32) -> Result<Notice> {
        let bytes = match format {
            ExportFormat::Raster(r) => self.export_raster(r, quality)?,
            ExportFormat::Svg => self.export_svg()?.into_bytes(),
            ExportFormat::Pdf => self.export_pdf()?,
        };
        io::write_bytes(path, &bytes)?;
        tracing::info!(session = %self.id, path = %path.display(), ?format, bytes = bytes.len(), "exported");
        Ok(Notice::Exported {
            format,
            path: path.to_path_buf(),
        })
    }

    /// Write into `dir` using `name` or the configured default file name.
    pub fn save_into(
        &self,
        dir: &Path,
        name: Option<&str>,
        format: ExportFormat,
        quality: f32,
    ) -> Result<Notice> {
        let file_name = self.default_file_name(name, format);
        self.save_to(&dir.join(file_name), format, quality)
    }

    /// `image.png`, `image.svg`, `download.pdf` and friends.
    pub fn default_file_name(&self, name: Option<&str>, format: ExportFormat) -> String {
        match format {
            ExportFormat::Pdf => name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(self.settings.default_pdf_name.as_str())
                .to_string(),
            _ => io::export_file_name(name, &self.settings.default_export_name, format.extension()),
        }
    }
}
