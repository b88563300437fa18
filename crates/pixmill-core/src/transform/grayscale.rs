//! Luminance grayscale.

use super::{map_pixels, RasterTransform};
use crate::raster::RasterImage;

/// Replaces R, G and B with `round(0.299R + 0.587G + 0.114B)`.
pub struct Grayscale;

/// Rec. 601 luma of an 8-bit pixel, rounded to the nearest integer.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    // Coefficients sum to 1, so y never leaves [0, 255].
    y.round() as u8
}

impl RasterTransform for Grayscale {
    fn apply(&self, raster: &mut RasterImage) {
        map_pixels(raster, |px| {
            let gray = luminance(px[0], px[1], px[2]);
            px[0] = gray;
            px[1] = gray;
            px[2] = gray;
        });
    }
}
