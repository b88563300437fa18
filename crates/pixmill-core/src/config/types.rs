//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the batch reads its archive and writes its trees.
///
/// Relative entries resolve against `base_dir`; see [`LayoutConfig::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Directory every relative path below is joined onto
    pub base_dir: PathBuf,

    /// Input archive
    pub archive: PathBuf,

    /// Directory the archive is extracted into
    pub extract_dir: PathBuf,

    /// Output root for grayscale images
    pub grayscale_dir: PathBuf,

    /// Output root for sepia images
    pub sepia_dir: PathBuf,

    /// Output root for dithered images
    pub dither_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            archive: PathBuf::from("myfile.zip"),
            extract_dir: PathBuf::from("unzipped"),
            grayscale_dir: PathBuf::from("grayscaled"),
            sepia_dir: PathBuf::from("sepia"),
            dither_dir: PathBuf::from("dithered"),
        }
    }
}

impl LayoutConfig {
    /// Build a layout whose every path lives under `base_dir`, keeping the
    /// default file and directory names.
    pub fn rooted_at(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Resolve one of the layout paths: `~` is expanded, absolute paths are
    /// kept, relative paths are joined onto the (expanded) base directory.
    pub fn resolve(&self, path: &std::path::Path) -> PathBuf {
        let expanded = expand_tilde(path);
        if expanded.is_absolute() {
            expanded
        } else {
            expand_tilde(&self.base_dir).join(expanded)
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.resolve(&self.archive)
    }

    pub fn extract_root(&self) -> PathBuf {
        self.resolve(&self.extract_dir)
    }

    pub fn grayscale_root(&self) -> PathBuf {
        self.resolve(&self.grayscale_dir)
    }

    pub fn sepia_root(&self) -> PathBuf {
        self.resolve(&self.sepia_dir)
    }

    pub fn dither_root(&self) -> PathBuf {
        self.resolve(&self.dither_dir)
    }
}

fn expand_tilde(path: &std::path::Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum number of transform jobs running at once
    pub parallel_workers: usize,

    /// File extensions the image locator picks up (case-insensitive)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec!["png".to_string()],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
