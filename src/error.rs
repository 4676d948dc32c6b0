//! Error types for the editor session.
//!
//! Every variant is recoverable: the operation that produced it aborts before
//! touching the pixel buffer or the history, and the session stays usable.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Please upload an image first.")]
    NoImageLoaded,

    #[error("Invalid dimensions ({0}). Please enter valid width and height values.")]
    InvalidDimension(String),

    #[error(
        "Invalid crop region {x},{y} {width}×{height} for a {buffer_width}×{buffer_height} image."
    )]
    InvalidCropRegion {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        buffer_width: u32,
        buffer_height: u32,
    },

    #[error("Invalid tolerance {0}. Tolerance must be a number >= 0.")]
    InvalidTolerance(f64),

    #[error("Pixel ({x}, {y}) is outside the {width}×{height} image.")]
    OutOfBounds { x: i64, y: i64, width: u32, height: u32 },

    #[error("Invalid color '{0}'. Expected a hex code like #ff0000.")]
    InvalidColor(String),

    #[error("Failed to export image as {format} ({reason}). Try a different format.")]
    EncodingFailed { format: String, reason: String },

    #[error("Please drop a valid image file (got '{0}').")]
    UnsupportedDropType(String),

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl EditorError {
    pub(crate) fn encoding(format: impl Into<String>, reason: impl ToString) -> Self {
        EditorError::EncodingFailed {
            format: format.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
