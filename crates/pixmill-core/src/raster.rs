//! Decoded 8-bit RGBA raster owned by a single transform job.

use image::RgbaImage;

use crate::error::PipelineError;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// A decoded image: dimensions plus a row-major RGBA byte buffer.
///
/// `pixels.len() == width * height * 4` always holds; constructors reject
/// anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an existing buffer, checking it against the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, PipelineError> {
        let expected = width as usize * height as usize * CHANNELS;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(PipelineError::BufferMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a raster from a list of `[r, g, b, a]` pixels in scan order.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: &[[u8; 4]],
    ) -> Result<Self, PipelineError> {
        Self::from_raw(width, height, pixels.concat())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        let p = &self.pixels[idx..idx + CHANNELS];
        [p[0], p[1], p[2], p[3]]
    }

    /// Byte offset of pixel `(x, y)`.
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }
}

impl TryFrom<RgbaImage> for RasterImage {
    type Error = PipelineError;

    fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_checks_length() {
        let err = RasterImage::from_raw(2, 2, vec![0; 15]).unwrap_err();
        match err {
            PipelineError::BufferMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_raw_rejects_empty_dimensions() {
        assert!(RasterImage::from_raw(0, 3, vec![]).is_err());
    }

    #[test]
    fn test_pixel_is_row_major() {
        let raster = RasterImage::from_pixels(
            2,
            2,
            &[[1, 0, 0, 255], [2, 0, 0, 255], [3, 0, 0, 255], [4, 0, 0, 255]],
        )
        .unwrap();
        assert_eq!(raster.pixel(1, 0)[0], 2);
        assert_eq!(raster.pixel(0, 1)[0], 3);
        assert_eq!(raster.index(1, 1), 12);
    }

    #[test]
    fn test_rgba_image_conversion_keeps_bytes() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(2, 0, image::Rgba([9, 8, 7, 6]));
        let raster = RasterImage::try_from(img.clone()).unwrap();
        assert_eq!(raster.pixel(2, 0), [9, 8, 7, 6]);
        assert_eq!(raster.into_raw(), img.into_raw());
    }

    #[test]
    fn test_rgba_image_conversion_rejects_empty_image() {
        let err = RasterImage::try_from(RgbaImage::new(0, 5)).unwrap_err();
        assert!(matches!(err, PipelineError::BufferMismatch { width: 0, height: 5, .. }));
    }
}
