//! Image processing pipeline components.
//!
//! - **discovery**: Find images under the extraction root
//! - **validate**: Cheap checks before decoding
//! - **decode**: PNG ⇄ [`RasterImage`](crate::raster::RasterImage) codec
//! - **processor**: Runs a single transform job
//! - **batch**: Plans jobs and fans them out with bounded concurrency

pub mod batch;
pub mod decode;
pub mod discovery;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use batch::{BatchOptions, BatchOrchestrator};
pub use decode::ImageCodec;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use processor::JobProcessor;
pub use validate::Validator;
