//! Input validation before decoding.

use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// The eight-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Validates source files before they are decoded.
#[derive(Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - File starts with the PNG signature
    ///
    /// All reads go through `tokio::fs`, so this never blocks a runtime worker.
    pub async fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(PipelineError::Decode {
                    path: path.to_path_buf(),
                    message: format!("Cannot read metadata: {}", e),
                })
            }
        };

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_signature(path).await
    }

    async fn check_signature(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot open file: {}", e),
            })?;

        let mut header = [0u8; 8];
        let mut bytes_read = 0;
        while bytes_read < header.len() {
            match file.read(&mut header[bytes_read..]).await {
                Ok(0) => break,
                Ok(n) => bytes_read += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(PipelineError::Decode {
                        path: path.to_path_buf(),
                        message: format!("Cannot read header: {}", e),
                    })
                }
            }
        }

        if !Self::is_png_header(&header[..bytes_read]) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Not a PNG file (invalid signature)".to_string(),
            });
        }

        Ok(())
    }

    fn is_png_header(header: &[u8]) -> bool {
        header == PNG_SIGNATURE
    }
}
