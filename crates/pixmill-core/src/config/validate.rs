//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }

        let layout = &self.layout;
        let roots = [
            ("layout.extract_dir", layout.extract_root()),
            ("layout.grayscale_dir", layout.grayscale_root()),
            ("layout.sepia_dir", layout.sepia_root()),
            ("layout.dither_dir", layout.dither_root()),
        ];
        for (i, (name_a, a)) in roots.iter().enumerate() {
            for (name_b, b) in &roots[i + 1..] {
                if a == b {
                    return Err(ConfigError::ValidationError(format!(
                        "{name_a} and {name_b} must point to different directories"
                    )));
                }
            }
        }
        Ok(())
    }
}
