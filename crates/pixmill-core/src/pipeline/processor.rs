//! Single-job processing: validate → decode → transform → encode → write.

use std::time::Instant;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{JobOutput, TransformJob};

use super::decode::ImageCodec;
use super::validate::Validator;

/// Runs one [`TransformJob`] end to end.
///
/// Each call performs its own decode, so jobs never share a raster and can
/// run concurrently without coordination.
#[derive(Clone)]
pub struct JobProcessor {
    codec: ImageCodec,
    validator: Validator,
}

impl JobProcessor {
    /// Create a new job processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            codec: ImageCodec::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
        }
    }

    /// Process a single job.
    ///
    /// Validation, file reads and writes are async; decoding, the pixel loop
    /// and encoding run on the blocking pool and never yield midway through a
    /// raster.
    pub async fn process(&self, job: &TransformJob) -> PipelineResult<JobOutput> {
        let start = Instant::now();
        tracing::debug!("Processing {}: {:?}", job.kind, job.source);

        // Validate
        self.validator.validate(&job.source).await?;

        // Decode
        let decode_start = Instant::now();
        let raster = self.codec.decode(&job.source).await?;
        let (width, height) = (raster.width(), raster.height());
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // Transform + encode
        let transform_start = Instant::now();
        let kind = job.kind;
        let destination = job.destination.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            let mut raster = raster;
            kind.transform().apply(&mut raster);
            ImageCodec::encode(&raster, &destination)
        })
        .await
        .map_err(|e| PipelineError::Aborted {
            path: job.source.clone(),
            kind: job.kind,
            message: e.to_string(),
        })??;
        tracing::trace!("  Transform + encode: {:?}", transform_start.elapsed());

        // Write
        ImageCodec::write(&encoded, &job.destination).await?;

        tracing::debug!(
            "Wrote {:?} ({}, {}x{}) in {:?}",
            job.destination,
            job.kind,
            width,
            height,
            start.elapsed()
        );

        Ok(JobOutput {
            width,
            height,
            bytes_written: encoded.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterImage;
    use crate::transform::TransformKind;

    async fn write_source(path: &std::path::Path) {
        let raster = RasterImage::from_pixels(
            2,
            1,
            &[[200, 10, 10, 255], [10, 10, 200, 128]],
        )
        .unwrap();
        let bytes = ImageCodec::encode(&raster, path).unwrap();
        ImageCodec::write(&bytes, path).await.unwrap();
    }

    #[tokio::test]
    async fn test_process_writes_transformed_png() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.png");
        write_source(&source).await;

        let job = TransformJob {
            source: source.clone(),
            destination: dir.path().join("out/gray/src.png"),
            kind: TransformKind::Grayscale,
        };
        let processor = JobProcessor::new(&Config::default());
        let output = processor.process(&job).await.unwrap();
        assert_eq!((output.width, output.height), (2, 1));
        assert!(output.bytes_written > 0);

        let codec = ImageCodec::new(Default::default());
        let written = codec.decode(&job.destination).await.unwrap();
        let [r, g, b, a] = written.pixel(1, 0);
        assert!(r == g && g == b);
        assert_eq!(a, 128);
    }

    #[tokio::test]
    async fn test_process_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"\x89PNG\r\n\x1a\nthen garbage").unwrap();

        let job = TransformJob {
            source,
            destination: dir.path().join("out.png"),
            kind: TransformKind::Sepia,
        };
        let processor = JobProcessor::new(&Config::default());
        let err = processor.process(&job).await.unwrap_err();
        assert_eq!(err.stage(), "decode");
        assert!(!job.destination.exists());
    }
}
