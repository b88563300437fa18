//! Pixmill Core - archive-to-filters image pipeline.
//!
//! Pixmill unpacks a ZIP archive of PNG images and writes three transformed
//! copies of every image, each into its own mirrored directory tree:
//!
//! ```text
//! myfile.zip → unzipped/ → (per image, per transform) decode → transform → encode
//!                              ├─ grayscaled/
//!                              ├─ sepia/
//!                              └─ dithered/
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixmill_core::{BatchOptions, BatchOrchestrator, Config};
//!
//! #[tokio::main]
//! async fn main() -> pixmill_core::Result<()> {
//!     let config = Config::load()?;
//!     let orchestrator = BatchOrchestrator::new(&config);
//!
//!     let report = orchestrator.run(&BatchOptions::default(), |_| {}).await?;
//!     println!("{} ok, {} failed", report.succeeded(), report.failed());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod archive;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod raster;
pub mod transform;
pub mod types;

// Re-exports for convenient access
pub use archive::{ArchiveExtractor, ExtractSummary};
pub use config::{Config, LayoutConfig};
pub use error::{
    ConfigError, ExtractionError, PipelineError, PipelineResult, PixmillError, Result,
};
pub use output::{write_report_file, OutputFormat, OutputWriter};
pub use pipeline::{BatchOptions, BatchOrchestrator, DiscoveredFile, ImageCodec, JobProcessor};
pub use raster::RasterImage;
pub use transform::{Dither, Grayscale, RasterTransform, Sepia, TransformKind};
pub use types::{BatchReport, JobOutcome, JobStatus, TransformJob};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
