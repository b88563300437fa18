//! PNG decoding into a [`RasterImage`] and encoding back out.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, GenericImageView, ImageEncoder, ImageFormat};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::raster::RasterImage;

/// Raster codec with configurable limits and decode timeout.
#[derive(Clone)]
pub struct ImageCodec {
    limits: LimitsConfig,
}

impl ImageCodec {
    /// Create a new codec with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode an image file.
    pub async fn decode(&self, path: &Path) -> Result<RasterImage, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;
        self.decode_from_bytes(bytes, path).await
    }

    /// Decode an in-memory encoded image with dimension checks and timeout.
    ///
    /// Decoding runs on the blocking pool so the async workers only ever wait
    /// on it.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<RasterImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let max_dim = self.limits.max_image_dimension;
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(&bytes, &path_owned, max_dim))
                .await
        })
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode (runs in spawn_blocking).
    ///
    /// Whatever the stored colour type, the result is 8-bit RGBA.
    pub fn decode_bytes_sync(
        bytes: &[u8],
        path: &Path,
        max_dim: u32,
    ) -> Result<RasterImage, PipelineError> {
        let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        if reader.format() != Some(ImageFormat::Png) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unsupported format (expected PNG)".to_string(),
            });
        }

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim,
            });
        }

        RasterImage::try_from(image.into_rgba8())
    }

    /// Encode a raster as PNG (Paeth filter, default compression).
    pub fn encode(raster: &RasterImage, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Paeth);
        encoder
            .write_image(
                raster.as_bytes(),
                raster.width(),
                raster.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(buffer)
    }

    /// Write encoded bytes to `dest`, creating parent directories.
    pub async fn write(bytes: &[u8], dest: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        tokio::fs::write(dest, bytes)
            .await
            .map_err(|e| PipelineError::Write {
                path: dest.to_path_buf(),
                source: e,
            })
    }
}
