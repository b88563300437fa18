//! Classic sepia tone matrix.

use super::{map_pixels, RasterTransform};
use crate::raster::RasterImage;

/// Applies the sepia matrix, saturating each channel at 255.
///
/// ```text
/// R' = min(255, 0.393R + 0.769G + 0.189B)
/// G' = min(255, 0.349R + 0.686G + 0.168B)
/// B' = min(255, 0.272R + 0.534G + 0.131B)
/// ```
///
/// The fractional part is dropped when the result is stored back into the
/// byte buffer.
pub struct Sepia;

/// Sepia-toned RGB for one pixel, computed from its original channels.
#[inline]
pub fn sepia_tone(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    // All coefficients are non-negative, only the upper bound needs clamping.
    let tone = |cr: f64, cg: f64, cb: f64| (cr * r + cg * g + cb * b).min(255.0) as u8;
    [
        tone(0.393, 0.769, 0.189),
        tone(0.349, 0.686, 0.168),
        tone(0.272, 0.534, 0.131),
    ]
}

impl RasterTransform for Sepia {
    fn apply(&self, raster: &mut RasterImage) {
        map_pixels(raster, |px| {
            let [r, g, b] = sepia_tone(px[0], px[1], px[2]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        });
    }
}
