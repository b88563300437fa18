//! Floyd-Steinberg error diffusion to pure black and white.
//!
//! The red channel is treated as the gray level. Each pixel is thresholded at
//! 128 and its quantization error is pushed onto the neighbours that have not
//! been visited yet:
//!
//! ```text
//!        X   7
//!    3   5   1      (sixteenths, via arithmetic shift)
//! ```
//!
//! The sweep is strictly sequential in raster order: every pixel depends on
//! the error left by its left neighbour and by the row above, so this cannot
//! go through [`map_pixels`](super::map_pixels).
//!
//! Diffused values accumulate in a signed 16-bit working plane instead of the
//! byte buffer, so a neighbour pushed past 255 (or below 0) is thresholded at
//! its true value rather than a wrapped or clamped one.

use super::RasterTransform;
use crate::raster::{RasterImage, CHANNELS};

/// Values below this become black, the rest white.
pub const THRESHOLD: i32 = 128;

/// Single-pass Floyd-Steinberg dithering on the red channel.
pub struct Dither;

impl RasterTransform for Dither {
    fn apply(&self, raster: &mut RasterImage) {
        let width = raster.width() as usize;
        let height = raster.height() as usize;

        let mut plane: Vec<i16> = raster
            .as_bytes()
            .chunks_exact(CHANNELS)
            .map(|px| i16::from(px[0]))
            .collect();
        let pixels = raster.as_bytes_mut();

        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let old = i32::from(plane[i]);
                let new = if old < THRESHOLD { 0 } else { 255 };
                let error = old - new;

                let idx = i * CHANNELS;
                pixels[idx] = new as u8;
                pixels[idx + 1] = new as u8;
                pixels[idx + 2] = new as u8;

                if x + 1 < width {
                    diffuse(&mut plane, i + 1, (error * 7) >> 4);
                }
                if y + 1 < height {
                    let below = i + width;
                    if x > 0 {
                        diffuse(&mut plane, below - 1, (error * 3) >> 4);
                    }
                    diffuse(&mut plane, below, (error * 5) >> 4);
                    if x + 1 < width {
                        diffuse(&mut plane, below + 1, error >> 4);
                    }
                }
            }
        }
    }
}

#[inline]
fn diffuse(plane: &mut [i16], i: usize, delta: i32) {
    // |delta| <= 7/16 of a bounded error, always representable.
    plane[i] = plane[i].saturating_add(delta as i16);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, levels: &[u8]) -> RasterImage {
        let pixels: Vec<[u8; 4]> = levels.iter().map(|&v| [v, v, v, 255]).collect();
        RasterImage::from_pixels(width, height, &pixels).unwrap()
    }

    fn reds(raster: &RasterImage) -> Vec<u8> {
        raster
            .as_bytes()
            .chunks_exact(CHANNELS)
            .map(|px| px[0])
            .collect()
    }

    #[test]
    fn test_column_scenario() {
        // Top: 100 -> 0, error 100. Bottom: 50 + (100*5 >> 4) = 50 + 31 = 81 -> 0.
        let mut raster = gray(1, 2, &[100, 50]);
        Dither.apply(&mut raster);
        assert_eq!(raster.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(raster.pixel(0, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn test_column_error_can_flip_neighbour() {
        // Bottom: 100 + 31 = 131 -> white.
        let mut raster = gray(1, 2, &[100, 100]);
        Dither.apply(&mut raster);
        assert_eq!(reds(&raster), vec![0, 255]);
    }

    #[test]
    fn test_right_neighbour_gets_seven_sixteenths() {
        // Right: 90 + (100*7 >> 4) = 90 + 43 = 133 -> white.
        let mut raster = gray(2, 1, &[100, 90]);
        Dither.apply(&mut raster);
        assert_eq!(reds(&raster), vec![0, 255]);

        // Right: 84 + 43 = 127 -> black.
        let mut raster = gray(2, 1, &[100, 84]);
        Dither.apply(&mut raster);
        assert_eq!(reds(&raster), vec![0, 0]);
    }

    #[test]
    fn test_negative_error_shift_floors() {
        // Top: 200 -> 255, error -55. (-55*5) >> 4 = -275 >> 4 = -18, where a
        // truncating division would give -17.
        // Bottom: 145 - 18 = 127 -> black (146 - 18 = 128 -> white).
        let mut raster = gray(1, 2, &[200, 145]);
        Dither.apply(&mut raster);
        assert_eq!(reds(&raster), vec![255, 0]);

        let mut raster = gray(1, 2, &[200, 146]);
        Dither.apply(&mut raster);
        assert_eq!(reds(&raster), vec![255, 255]);
    }

    #[test]
    fn test_accumulated_value_above_255_does_not_wrap() {
        // p0: 127 -> 0, error 127, p1 += 55 -> 305 -> white, error 50.
        // p2: 0 + (50*7 >> 4) = 21 -> black.
        // With an 8-bit buffer p1 would wrap to 49 and turn black.
        let mut raster = gray(3, 1, &[127, 250, 0]);
        Dither.apply(&mut raster);
        assert_eq!(reds(&raster), vec![0, 255, 0]);
    }

    #[test]
    fn test_below_left_and_below_right_weights() {
        // Centre-top: 100 -> 0, error 100.
        // Below-left (0,1): 120 + (300 >> 4) = 120 + 18 = 138 -> white.
        // Top-right: 0 + 43 = 43 -> 0, error 43.
        // Below-right (2,1): 122 + (100 >> 4) + (215 >> 4) = 122 + 6 + 13 = 141 -> white.
        let mut raster = gray(3, 2, &[0, 100, 0, 120, 0, 122]);
        Dither.apply(&mut raster);
        assert_eq!(reds(&raster), vec![0, 0, 0, 255, 0, 255]);
    }

    #[test]
    fn test_output_is_binary_and_alpha_kept() {
        let width = 17u32;
        let height = 11u32;
        let pixels: Vec<[u8; 4]> = (0..width * height)
            .map(|i| {
                let v = (i * 255 / (width * height)) as u8;
                [v, v / 2, 255 - v, (i % 200) as u8]
            })
            .collect();
        let original = RasterImage::from_pixels(width, height, &pixels).unwrap();
        let mut raster = original.clone();
        Dither.apply(&mut raster);

        for y in 0..height {
            for x in 0..width {
                let [r, g, b, a] = raster.pixel(x, y);
                assert!(r == 0 || r == 255);
                assert_eq!(r, g);
                assert_eq!(r, b);
                assert_eq!(a, original.pixel(x, y)[3]);
            }
        }
    }

    #[test]
    fn test_mid_gray_mixes_black_and_white() {
        let mut raster = gray(10, 10, &[128; 100]);
        Dither.apply(&mut raster);
        let white = reds(&raster).iter().filter(|&&v| v == 255).count();
        assert!(white > 30 && white < 70, "white = {white}");
    }

    #[test]
    fn test_extremes_are_stable() {
        let mut black = gray(4, 4, &[0; 16]);
        Dither.apply(&mut black);
        assert!(reds(&black).iter().all(|&v| v == 0));

        let mut white = gray(4, 4, &[255; 16]);
        Dither.apply(&mut white);
        assert!(reds(&white).iter().all(|&v| v == 255));
    }
}
