use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ops::export::PdfLayout;
use crate::ops::transform::Interpolation;

/// User preferences, stored as JSON.
///
/// Every field has a default, so partial or empty files load cleanly and
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File stem used for raster and SVG exports when none is given.
    pub default_export_name: String,
    /// Full file name used for PDF exports when none is given.
    pub default_pdf_name: String,
    /// Quality factor for lossy exports, 0.0–1.0.
    pub export_quality: f32,
    pub interpolation: Interpolation,
    pub pdf: PdfLayout,
    pub debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_export_name: "image".into(),
            default_pdf_name: "download.pdf".into(),
            export_quality: 0.92,
            interpolation: Interpolation::default(),
            pdf: PdfLayout::default(),
            debug_logging: false,
        }
    }
}

impl Settings {
    /// Load from `path`. A missing or empty file yields the defaults; any
    /// other read failure is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a file the user named explicitly. It has to exist.
    pub fn load_required(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// `<config dir>/SnapEdit/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|d| d.join("SnapEdit").join("settings.json"))
    }
}
