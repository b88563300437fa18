//! Batch orchestration: extract → discover → plan → fan out jobs → collect.
//!
//! Every (image, transform) pair becomes an independent tokio task, bounded
//! by a semaphore. A failing job is recorded in the [`BatchReport`] and never
//! cancels its siblings; the report is returned once every task has settled.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::archive::{ArchiveExtractor, ExtractSummary};
use crate::config::{Config, LayoutConfig};
use crate::error::{PipelineError, Result};
use crate::transform::TransformKind;
use crate::types::{BatchReport, JobOutcome, TransformJob};

use super::discovery::{DiscoveredFile, FileDiscovery};
use super::processor::JobProcessor;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Transforms to run for every image
    pub kinds: Vec<TransformKind>,
    /// Process the existing extraction tree instead of unpacking the archive
    pub skip_extract: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            kinds: TransformKind::ALL.to_vec(),
            skip_extract: false,
        }
    }
}

/// Drives a whole batch for one [`LayoutConfig`].
pub struct BatchOrchestrator {
    layout: LayoutConfig,
    processor: JobProcessor,
    discovery: FileDiscovery,
    parallel: usize,
}

impl BatchOrchestrator {
    /// Create an orchestrator from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            layout: config.layout.clone(),
            processor: JobProcessor::new(config),
            discovery: FileDiscovery::new(config.processing.clone()),
            parallel: config.processing.parallel_workers.max(1),
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Unpack the configured archive into the extraction root.
    pub async fn extract(&self) -> Result<ExtractSummary> {
        let archive = self.layout.archive_path();
        let dest = self.layout.extract_root();
        tracing::debug!("Extracting {:?} into {:?}", archive, dest);
        Ok(ArchiveExtractor::extract_async(archive, dest).await?)
    }

    /// Find every supported image under the extraction root.
    pub async fn discover(&self) -> Result<Vec<DiscoveredFile>> {
        Ok(self
            .discovery
            .discover_async(self.layout.extract_root())
            .await?)
    }

    /// Output root for a transform.
    pub fn output_root(&self, kind: TransformKind) -> PathBuf {
        match kind {
            TransformKind::Grayscale => self.layout.grayscale_root(),
            TransformKind::Sepia => self.layout.sepia_root(),
            TransformKind::Dither => self.layout.dither_root(),
        }
    }

    /// Expand discovered images into jobs, one per requested transform, each
    /// writing to the same relative path under its transform's root.
    pub fn plan(&self, files: &[DiscoveredFile], kinds: &[TransformKind]) -> Vec<TransformJob> {
        let source_root = self.layout.extract_root();
        let roots: Vec<(TransformKind, PathBuf)> =
            kinds.iter().map(|&k| (k, self.output_root(k))).collect();

        files
            .iter()
            .flat_map(|file| {
                let source = source_root.join(&file.relative);
                roots.iter().map(move |(kind, root)| TransformJob {
                    source: source.clone(),
                    destination: root.join(&file.relative),
                    kind: *kind,
                })
            })
            .collect()
    }

    /// Run jobs concurrently and wait for all of them.
    ///
    /// Spawns one tokio task per job, bounded by a semaphore of
    /// `parallel_workers` permits. `on_result` is called for each settled job
    /// as it completes, so callers can report progress in real time.
    pub async fn run_jobs<F>(&self, jobs: Vec<TransformJob>, on_result: F) -> BatchReport
    where
        F: Fn(&JobOutcome) + Send + Sync + 'static,
    {
        let start = Instant::now();
        let images = count_sources(&jobs);
        let semaphore = Arc::new(Semaphore::new(self.parallel));
        let on_result = Arc::new(on_result);
        let mut handles = Vec::with_capacity(jobs.len());

        for job in jobs {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                tracing::warn!("Job semaphore closed unexpectedly, stopping batch");
                break;
            };

            let processor = self.processor.clone();
            let on_result = on_result.clone();
            let task_job = job.clone();

            let handle = tokio::spawn(async move {
                let job_start = Instant::now();
                let result = processor.process(&task_job).await;
                let elapsed_ms = job_start.elapsed().as_millis() as u64;
                drop(permit); // Release concurrency permit before callback

                let outcome = match result {
                    Ok(output) => JobOutcome::succeeded(&task_job, &output, elapsed_ms),
                    Err(e) => {
                        tracing::error!(
                            kind = %task_job.kind,
                            source = ?task_job.source,
                            "Failed: {e}"
                        );
                        JobOutcome::failed(&task_job, &e, elapsed_ms)
                    }
                };
                on_result(&outcome);
                outcome
            });

            handles.push((job, handle));
        }

        // Wait for every task; a panic is recorded like any other failure.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (job, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("Job task for {:?} ({}) panicked: {e}", job.source, job.kind);
                    let err = PipelineError::Aborted {
                        path: job.source.clone(),
                        kind: job.kind,
                        message: e.to_string(),
                    };
                    let outcome = JobOutcome::failed(&job, &err, 0);
                    on_result(&outcome);
                    outcomes.push(outcome);
                }
            }
        }

        BatchReport {
            images,
            outcomes,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Extract (unless skipped), discover and plan.
    ///
    /// Extraction and discovery errors are returned here; an empty tree is
    /// not an error and yields no jobs.
    pub async fn prepare(&self, options: &BatchOptions) -> Result<Vec<TransformJob>> {
        if options.skip_extract {
            tracing::debug!("Skipping extraction");
        } else {
            let summary = self.extract().await?;
            tracing::info!(
                "Unzipped {} file(s) into {:?}",
                summary.files,
                self.layout.extract_root()
            );
            if summary.skipped > 0 {
                tracing::debug!("Skipped {} archive entries", summary.skipped);
            }
        }

        let files = self.discover().await?;
        if files.is_empty() {
            tracing::warn!(
                "No supported image files found under {:?}",
                self.layout.extract_root()
            );
        } else {
            tracing::info!(
                "Found {} image(s), running {} transform(s) each",
                files.len(),
                options.kinds.len()
            );
        }

        Ok(self.plan(&files, &options.kinds))
    }

    /// Full batch: [`prepare`](Self::prepare), then [`run_jobs`](Self::run_jobs).
    ///
    /// Extraction and discovery errors abort the batch; job errors only show
    /// up in the returned report.
    pub async fn run<F>(&self, options: &BatchOptions, on_result: F) -> Result<BatchReport>
    where
        F: Fn(&JobOutcome) + Send + Sync + 'static,
    {
        let jobs = self.prepare(options).await?;
        Ok(self.run_jobs(jobs, on_result).await)
    }
}

fn count_sources(jobs: &[TransformJob]) -> usize {
    let mut sources: Vec<&Path> = jobs.iter().map(|j| j.source.as_path()).collect();
    sources.sort();
    sources.dedup();
    sources.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::ImageCodec;
    use crate::raster::RasterImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config_at(base: &Path) -> Config {
        let mut config = Config::default();
        config.layout = LayoutConfig::rooted_at(base);
        config.processing.parallel_workers = 2;
        config
    }

    async fn write_png(path: &Path) {
        let raster = RasterImage::from_pixels(
            2,
            2,
            &[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [90, 90, 90, 0]],
        )
        .unwrap();
        let bytes = ImageCodec::encode(&raster, path).unwrap();
        ImageCodec::write(&bytes, path).await.unwrap();
    }

    #[test]
    fn test_plan_mirrors_relative_paths() {
        let config = config_at(Path::new("/base"));
        let orchestrator = BatchOrchestrator::new(&config);
        let files = vec![DiscoveredFile {
            relative: PathBuf::from("trip/day1.png"),
        }];

        let jobs = orchestrator.plan(&files, &TransformKind::ALL);
        assert_eq!(jobs.len(), 3);
        assert!(jobs
            .iter()
            .all(|j| j.source == Path::new("/base/unzipped/trip/day1.png")));
        assert_eq!(
            jobs[0].destination,
            PathBuf::from("/base/grayscaled/trip/day1.png")
        );
        assert_eq!(jobs[1].destination, PathBuf::from("/base/sepia/trip/day1.png"));
        assert_eq!(
            jobs[2].destination,
            PathBuf::from("/base/dithered/trip/day1.png")
        );
    }

    #[test]
    fn test_plan_respects_kind_subset() {
        let orchestrator = BatchOrchestrator::new(&config_at(Path::new("/b")));
        let files = vec![
            DiscoveredFile {
                relative: PathBuf::from("a.png"),
            },
            DiscoveredFile {
                relative: PathBuf::from("b.png"),
            },
        ];
        let jobs = orchestrator.plan(&files, &[TransformKind::Dither]);
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.kind == TransformKind::Dither));
    }

    #[tokio::test]
    async fn test_run_jobs_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        let extract_root = config.layout.extract_root();
        write_png(&extract_root.join("good.png")).await;
        std::fs::write(extract_root.join("bad.png"), b"not an image").unwrap();

        let orchestrator = BatchOrchestrator::new(&config);
        let files = orchestrator.discover().await.unwrap();
        assert_eq!(files.len(), 2);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = seen.clone();
        let jobs = orchestrator.plan(&files, &TransformKind::ALL);
        let report = orchestrator
            .run_jobs(jobs, move |_| {
                seen_cb.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(report.images, 2);
        assert_eq!(report.outcomes.len(), 6);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 6);
        assert!(report
            .failures()
            .all(|o| o.source.ends_with("bad.png")));

        for kind in TransformKind::ALL {
            assert!(orchestrator.output_root(kind).join("good.png").exists());
            assert!(!orchestrator.output_root(kind).join("bad.png").exists());
        }
    }

    #[tokio::test]
    async fn test_run_fails_without_archive() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = BatchOrchestrator::new(&config_at(dir.path()));
        let err = orchestrator
            .run(&BatchOptions::default(), |_| {})
            .await
            .unwrap_err();
        assert!(err.to_string().contains("myfile.zip"));
    }

    #[tokio::test]
    async fn test_prepare_on_empty_tree_plans_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = BatchOrchestrator::new(&config_at(dir.path()));
        std::fs::create_dir_all(orchestrator.layout().extract_root()).unwrap();
        let options = BatchOptions {
            skip_extract: true,
            ..Default::default()
        };

        assert!(orchestrator.prepare(&options).await.unwrap().is_empty());
        let report = orchestrator.run(&options, |_| {}).await.unwrap();
        assert_eq!(report.images, 0);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_run_skip_extract_without_tree_is_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = BatchOrchestrator::new(&config_at(dir.path()));
        let options = BatchOptions {
            skip_extract: true,
            ..Default::default()
        };
        let err = orchestrator.run(&options, |_| {}).await.unwrap_err();
        assert!(err.to_string().contains("Discovery failed"));
    }
}
