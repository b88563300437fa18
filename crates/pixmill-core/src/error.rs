//! Error types for the Pixmill pipeline.
//!
//! Errors are organized by stage: extraction and discovery failures abort the
//! whole batch, while per-job failures (decode, encode, write) are captured at
//! the job boundary and reported alongside their siblings.

use std::path::PathBuf;
use thiserror::Error;

use crate::transform::TransformKind;

/// Top-level error type for Pixmill operations.
#[derive(Error, Debug)]
pub enum PixmillError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Archive extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Archive extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Archive file does not exist
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    /// Archive could not be opened or its central directory is corrupt
    #[error("Cannot read archive {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    /// A single entry could not be decompressed
    #[error("Corrupt entry {entry:?} in {path}: {message}")]
    CorruptEntry {
        path: PathBuf,
        entry: String,
        message: String,
    },

    /// Writing extracted content failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image root could not be walked
    #[error("Discovery failed for {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Image encoding failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Writing the encoded output failed
    #[error("Write error for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decode buffer disagrees with the declared dimensions
    #[error("Buffer length mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    BufferMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The job's worker task died before producing a result
    #[error("{kind} job for {path} aborted: {message}")]
    Aborted {
        path: PathBuf,
        kind: TransformKind,
        message: String,
    },
}

impl PipelineError {
    /// Short stage label used in reports and log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Discovery { .. } => "discovery",
            Self::Decode { .. }
            | Self::BufferMismatch { .. }
            | Self::FileTooLarge { .. }
            | Self::ImageTooLarge { .. }
            | Self::FileNotFound(_) => "decode",
            Self::Timeout { .. } => "timeout",
            Self::Encode { .. } => "encode",
            Self::Write { .. } => "write",
            Self::Aborted { .. } => "task",
        }
    }
}

/// Convenience type alias for Pixmill results.
pub type Result<T> = std::result::Result<T, PixmillError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
