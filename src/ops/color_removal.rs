use rayon::prelude::*;

use crate::canvas::{PixelBuffer, Rgb};

/// What happens to a pixel whose color falls within tolerance of the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// Alpha goes to 0; RGB is left as it was.
    Erase,
    /// RGB becomes the replacement and alpha is forced to 255.
    Replace(Rgb),
}

impl ColorMode {
    pub fn label(&self) -> &'static str {
        match self {
            ColorMode::Erase => "Remove Color",
            ColorMode::Replace(_) => "Replace Color",
        }
    }
}

/// Global color removal / replacement by Euclidean RGB distance.
///
/// Every pixel with `sqrt(dr² + dg² + db²) <= tolerance` is affected; alpha
/// does not take part in the distance. A `tolerance` of 0 selects exact RGB
/// matches only, and a negative or NaN tolerance selects nothing.
///
/// Rows are processed in parallel. Each pixel's outcome depends only on its
/// own value, so the result is the same as a sequential pass.
///
/// Returns the number of pixels that matched.
pub fn apply_color_distance(
    buffer: &mut PixelBuffer,
    target: Rgb,
    tolerance: f64,
    mode: ColorMode,
) -> usize {
    if !(tolerance >= 0.0) {
        return 0;
    }
    let row_bytes = buffer.width() as usize * 4;

    buffer
        .as_raw_mut()
        .par_chunks_mut(row_bytes)
        .map(|row| {
            let mut matched = 0usize;
            for px in row.chunks_exact_mut(4) {
                // Rooted distance, so pixels sitting exactly on the tolerance
                // boundary are classified the same way as in the UI.
                if (color_dist_sq(px, target) as f64).sqrt() > tolerance {
                    continue;
                }
                match mode {
                    ColorMode::Erase => px[3] = 0,
                    ColorMode::Replace(c) => {
                        px[0] = c.r;
                        px[1] = c.g;
                        px[2] = c.b;
                        px[3] = 255;
                    }
                }
                matched += 1;
            }
            matched
        })
        .sum()
}

/// Euclidean distance in RGB space.
pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    (color_dist_sq(&[a.r, a.g, a.b], b) as f64).sqrt()
}

/// Squared Euclidean distance in RGB space (first three channels of `px`).
#[inline]
fn color_dist_sq(px: &[u8], target: Rgb) -> u32 {
    let dr = px[0] as i32 - target.r as i32;
    let dg = px[1] as i32 - target.g as i32;
    let db = px[2] as i32 - target.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}
