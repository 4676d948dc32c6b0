//! SnapEdit — a single-image raster editor core.
//!
//! An [`EditorSession`] owns the live [`PixelBuffer`], a bounded undo/redo
//! history of full snapshots, and the snapshot taken at load time. Edits
//! (resize, crop, color removal/replacement) go through the session, which
//! commits a new snapshot after each successful one. Exports cover PNG, JPEG,
//! WebP, a pixel-rect SVG dump, and a single-page PDF.

pub mod canvas;
pub mod cli;
pub mod components;
pub mod error;
pub mod io;
pub mod logger;
pub mod ops;
pub mod session;
pub mod settings;

pub use canvas::{CropRegion, PixelBuffer, Rgb};
pub use components::history::{HistoryManager, MAX_HISTORY_STEPS, Snapshot};
pub use error::EditorError;
pub use io::{ExportFormat, RasterFormat, SourceFormat, has_alpha_channel_hint};
pub use ops::color_removal::ColorMode;
pub use session::{EditorSession, Notice};
pub use settings::Settings;
